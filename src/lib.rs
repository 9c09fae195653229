pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use crate::services::{
    admission_service::AdmissionService, notification_service::NotificationService,
    question_service::QuestionService, submission_service::SubmissionService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub question_service: QuestionService,
    pub admission_service: AdmissionService,
    pub submission_service: SubmissionService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let notification_service =
            NotificationService::new(pool.clone(), config.notification_webhook_url.clone());
        let question_service = QuestionService::new(pool.clone());
        let admission_service = AdmissionService::new(pool.clone());
        let submission_service =
            SubmissionService::new(pool.clone(), notification_service.clone());

        Self {
            pool,
            question_service,
            admission_service,
            submission_service,
            notification_service,
        }
    }
}
