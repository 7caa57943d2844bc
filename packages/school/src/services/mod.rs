pub mod avatar;
pub mod faculty;
pub mod student;

pub use avatar::{AvatarService, AvatarUpload, UploadLocks};
pub use faculty::FacultyService;
pub use student::{DeletedStudent, StudentService};
