/// The daily security report: scrape, render, deliver
pub mod security_report;
