pub mod greetings;
pub mod health;
