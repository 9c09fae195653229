pub mod admission_service;
pub mod grading_service;
pub mod notification_service;
pub mod question_service;
pub mod submission_service;
