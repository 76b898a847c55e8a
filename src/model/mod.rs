pub mod course;
pub mod enrollment;
pub mod payment;
pub mod student;
pub mod user;

pub use course::Course;
pub use enrollment::EnrollmentDetail;
pub use payment::Payment;
pub use student::Student;
pub use user::{User, UserSummary};
