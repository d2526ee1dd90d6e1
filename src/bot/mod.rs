/// Delivery of the daily report to the configured Telegram chat
pub mod telegram;
