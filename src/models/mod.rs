pub mod answer;
pub mod attempt;
pub mod exam;
pub mod notification;
pub mod question;
