use serde_json::json;

use crate::common::{TestApp, routes};

mod crud {
    use super::*;

    #[tokio::test]
    async fn create_and_get_student() {
        let app = TestApp::spawn().await;
        let gryffindor = app.create_faculty("Gryffindor", "red").await;

        let res = app
            .post(
                routes::STUDENTS,
                &json!({ "name": "Harry", "age": 17, "faculty_id": gryffindor }),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "Harry");
        assert_eq!(res.body["faculty"]["name"], "Gryffindor");

        let got = app.get(&routes::student(res.id())).await;
        assert_eq!(got.status, 200);
        assert_eq!(got.body, res.body);
    }

    #[tokio::test]
    async fn student_without_faculty_has_null_faculty() {
        let app = TestApp::spawn().await;
        let res = app
            .post(routes::STUDENTS, &json!({ "name": "Luna", "age": 15 }))
            .await;
        assert_eq!(res.status, 200);
        assert!(res.body["faculty"].is_null());
    }

    #[tokio::test]
    async fn create_validates_input() {
        let app = TestApp::spawn().await;

        let blank = app
            .post(routes::STUDENTS, &json!({ "name": "  ", "age": 17 }))
            .await;
        assert_eq!(blank.status, 400);
        assert_eq!(blank.body["message"], "Student name cannot be null or empty");

        let age = app
            .post(routes::STUDENTS, &json!({ "name": "Harry", "age": 0 }))
            .await;
        assert_eq!(age.status, 400);

        let malformed = app
            .post(routes::STUDENTS, &json!({ "name": "Harry" }))
            .await;
        assert_eq!(malformed.status, 400);
        assert_eq!(malformed.code(), "INVALID_ARGUMENT");

        let faculty = app
            .post(
                routes::STUDENTS,
                &json!({ "name": "Harry", "age": 17, "faculty_id": 99 }),
            )
            .await;
        assert_eq!(faculty.status, 404);
    }

    #[tokio::test]
    async fn get_missing_or_invalid_id() {
        let app = TestApp::spawn().await;

        let missing = app.get(&routes::student(12)).await;
        assert_eq!(missing.status, 404);
        assert_eq!(missing.code(), "NOT_FOUND");

        let invalid = app.get(&routes::student(-1)).await;
        assert_eq!(invalid.status, 400);
        assert_eq!(invalid.body["message"], "Invalid student id: -1");
    }

    #[tokio::test]
    async fn list_students_in_id_order() {
        let app = TestApp::spawn().await;
        let a = app.create_student("Fred", 17, None).await;
        let b = app.create_student("George", 17, None).await;

        let res = app.get(routes::STUDENTS).await;
        assert_eq!(res.status, 200);
        let ids: Vec<_> = res.body.as_array().unwrap().iter().map(|s| s["id"].clone()).collect();
        assert_eq!(ids, [json!(a), json!(b)]);
    }

    #[tokio::test]
    async fn update_replaces_student() {
        let app = TestApp::spawn().await;
        let slytherin = app.create_faculty("Slytherin", "green").await;
        let id = app.create_student("Tom", 16, None).await;

        let res = app
            .put(
                routes::STUDENTS,
                &json!({ "id": id, "name": "Voldemort", "age": 71, "faculty_id": slytherin }),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "Voldemort");
        assert_eq!(res.body["faculty"]["id"], slytherin);

        // Omitting the faculty clears it.
        let res = app
            .put(routes::STUDENTS, &json!({ "id": id, "name": "Tom", "age": 16 }))
            .await;
        assert!(res.body["faculty"].is_null());

        let missing = app
            .put(routes::STUDENTS, &json!({ "id": id + 100, "name": "X", "age": 1 }))
            .await;
        assert_eq!(missing.status, 404);
    }

    #[tokio::test]
    async fn delete_returns_prior_state() {
        let app = TestApp::spawn().await;
        let id = app.create_student("Peter", 35, None).await;

        let res = app.delete(&routes::student(id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["name"], "Peter");

        assert_eq!(app.get(&routes::student(id)).await.status, 404);
        assert_eq!(app.delete(&routes::student(id)).await.status, 404);
    }
}

mod queries {
    use super::*;

    async fn seed(app: &TestApp) {
        for (name, age) in [("Harry", 17), ("Ginny", 16), ("Ron", 17), ("Percy", 20), ("Albus", 11)] {
            app.create_student(name, age, None).await;
        }
    }

    fn names(body: &serde_json::Value) -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn by_age() {
        let app = TestApp::spawn().await;
        seed(&app).await;

        let res = app.get(&routes::students_by_age(17)).await;
        assert_eq!(res.status, 200);
        assert_eq!(names(&res.body), ["Harry", "Ron"]);

        assert_eq!(app.get(&routes::students_by_age(0)).await.status, 400);
    }

    #[tokio::test]
    async fn by_age_range_is_inclusive() {
        let app = TestApp::spawn().await;
        seed(&app).await;

        let res = app.get(&routes::students_by_age_range(16, 17)).await;
        assert_eq!(res.status, 200);
        assert_eq!(names(&res.body), ["Harry", "Ginny", "Ron"]);

        let inverted = app.get(&routes::students_by_age_range(20, 11)).await;
        assert_eq!(inverted.status, 400);
        assert_eq!(inverted.body["message"], "Min age cannot be greater than max age");

        let malformed = app.get("/student/agebetween/eleven").await;
        assert_eq!(malformed.status, 400);
    }

    #[tokio::test]
    async fn count_and_average() {
        let app = TestApp::spawn().await;

        assert_eq!(app.get(routes::STUDENT_COUNT).await.body, json!(0));
        assert_eq!(app.get(routes::STUDENT_AGE_AVG).await.body, json!(0.0));

        app.create_student("Harry", 17, None).await;
        app.create_student("Ginny", 16, None).await;

        assert_eq!(app.get(routes::STUDENT_COUNT).await.body, json!(2));
        assert_eq!(app.get(routes::STUDENT_AGE_AVG).await.body, json!(16.5));
    }

    #[tokio::test]
    async fn last_five_newest_first() {
        let app = TestApp::spawn().await;
        let mut ids = Vec::new();
        for i in 1..=7 {
            ids.push(app.create_student(&format!("Student {i}"), 10 + i, None).await);
        }

        let res = app.get(routes::STUDENT_LAST).await;
        let got: Vec<i64> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_i64().unwrap())
            .collect();
        let expected: Vec<i64> = ids.iter().rev().take(5).map(|&id| id as i64).collect();
        assert_eq!(got, expected);
    }

    #[tokio::test]
    async fn faculty_of_student() {
        let app = TestApp::spawn().await;
        let ravenclaw = app.create_faculty("Ravenclaw", "blue").await;
        let cho = app.create_student("Cho", 17, Some(ravenclaw)).await;
        let luna = app.create_student("Luna", 15, None).await;

        let res = app.get(&routes::faculty_of_student(cho)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!({ "id": ravenclaw, "name": "Ravenclaw", "color": "blue" }));

        let none = app.get(&routes::faculty_of_student(luna)).await;
        assert_eq!(none.status, 204);
        assert!(none.bytes.is_empty());

        assert_eq!(app.get(&routes::faculty_of_student(999)).await.status, 404);
    }

    #[tokio::test]
    async fn names_by_prefix() {
        let app = TestApp::spawn().await;
        seed(&app).await;
        app.create_student("arthur", 50, None).await;

        let default = app.get(routes::STUDENT_NAMES).await;
        assert_eq!(default.status, 200);
        assert_eq!(default.body, json!(["ALBUS", "ARTHUR"]));

        let custom = app.get(&format!("{}?prefix=g", routes::STUDENT_NAMES)).await;
        assert_eq!(custom.body, json!(["GINNY"]));
    }
}
