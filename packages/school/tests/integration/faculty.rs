use serde_json::json;

use crate::common::{TestApp, routes};

mod crud {
    use super::*;

    #[tokio::test]
    async fn create_and_get_faculty_with_students() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::FACULTIES, &json!({ "name": "Gryffindor", "color": "red" }))
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        let id = res.id();
        assert_eq!(res.body["students"], json!([]));

        let harry = app.create_student("Harry", 17, Some(id)).await;
        app.create_student("Draco", 17, None).await;

        let got = app.get(&routes::faculty(id)).await;
        assert_eq!(got.status, 200);
        assert_eq!(got.body["name"], "Gryffindor");
        assert_eq!(
            got.body["students"],
            json!([{ "id": harry, "name": "Harry", "age": 17 }])
        );
    }

    #[tokio::test]
    async fn create_validates_input() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::FACULTIES, &json!({ "name": "Hufflepuff", "color": "" }))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Faculty color cannot be null or empty");

        let res = app.post(routes::FACULTIES, &json!({ "color": "blue" })).await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn get_missing_faculty() {
        let app = TestApp::spawn().await;
        assert_eq!(app.get(&routes::faculty(3)).await.status, 404);
        assert_eq!(app.get(&routes::faculty(0)).await.status, 400);
    }

    #[tokio::test]
    async fn update_replaces_faculty() {
        let app = TestApp::spawn().await;
        let id = app.create_faculty("Ravenclaw", "blue").await;

        let res = app
            .put(
                routes::FACULTIES,
                &json!({ "id": id, "name": "Ravenclaw", "color": "bronze" }),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["color"], "bronze");

        let missing = app
            .put(
                routes::FACULTIES,
                &json!({ "id": id + 1, "name": "Nope", "color": "grey" }),
            )
            .await;
        assert_eq!(missing.status, 404);
    }

    #[tokio::test]
    async fn delete_detaches_students() {
        let app = TestApp::spawn().await;
        let id = app.create_faculty("Slytherin", "green").await;
        let draco = app.create_student("Draco", 17, Some(id)).await;

        let res = app.delete(&routes::faculty(id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!({ "id": id, "name": "Slytherin", "color": "green" }));

        assert_eq!(app.get(&routes::faculty(id)).await.status, 404);
        let student = app.get(&routes::student(draco)).await;
        assert_eq!(student.status, 200);
        assert!(student.body["faculty"].is_null());
    }
}

mod queries {
    use super::*;

    async fn seed(app: &TestApp) {
        app.create_faculty("Gryffindor", "Red").await;
        app.create_faculty("Hufflepuff", "Yellow").await;
        app.create_faculty("Slytherin", "Green").await;
    }

    fn names(body: &serde_json::Value) -> Vec<&str> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn list_and_filter() {
        let app = TestApp::spawn().await;
        seed(&app).await;

        let all = app.get(routes::FACULTIES).await;
        assert_eq!(names(&all.body), ["Gryffindor", "Hufflepuff", "Slytherin"]);

        let by_name = app.get("/faculty?name=slytherin").await;
        assert_eq!(names(&by_name.body), ["Slytherin"]);

        let by_color = app.get("/faculty?color=YELLOW").await;
        assert_eq!(names(&by_color.body), ["Hufflepuff"]);

        let name_wins = app.get("/faculty?name=Gryffindor&color=green").await;
        assert_eq!(names(&name_wins.body), ["Gryffindor"]);

        let nothing = app.get("/faculty?name=Durmstrang").await;
        assert_eq!(nothing.status, 200);
        assert!(nothing.body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn students_of_faculty() {
        let app = TestApp::spawn().await;
        let id = app.create_faculty("Hufflepuff", "yellow").await;
        app.create_student("Cedric", 17, Some(id)).await;
        app.create_student("Hannah", 15, Some(id)).await;
        app.create_student("Cho", 16, None).await;

        let res = app.get(&routes::faculty_students(id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(names(&res.body), ["Cedric", "Hannah"]);

        assert_eq!(app.get(&routes::faculty_students(id + 5)).await.status, 404);
    }

    #[tokio::test]
    async fn longest_name() {
        let app = TestApp::spawn().await;

        let empty = app.get(routes::FACULTY_LONGEST_NAME).await;
        assert_eq!(empty.status, 404);

        seed(&app).await;
        let res = app.get(routes::FACULTY_LONGEST_NAME).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.text, "Gryffindor");
    }
}
