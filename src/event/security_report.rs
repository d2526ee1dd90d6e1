use anyhow::Result;
use chrono::{DateTime, Local};

use crate::{
    bot,
    crawler::bcse,
    declare::{Extraction, TradingSnapshot},
    logging,
};

/// Runs one report cycle: fetch the snapshot (live or fallback), render the
/// message, deliver it. Only delivery can fail.
pub async fn execute() -> Result<()> {
    logging::info_console("Fetching trading data from BCSE".to_string());
    let extraction = bcse::security::fetch().await;

    match &extraction {
        Extraction::Scraped(snapshot) => {
            logging::info_file_async(format!("Scraped snapshot: {:?}", snapshot));
        }
        Extraction::Fallback(_, reason) => {
            logging::info_console(format!("Sending the fallback snapshot because {}", reason));
        }
    }

    let message = format_message(extraction.snapshot(), Local::now());
    let response = bot::telegram::send(&message).await?;

    if let Some(sent) = response.result {
        logging::info_file_async(format!("Report delivered, message_id {}", sent.message_id));
    }
    logging::info_console("Security report delivered".to_string());

    Ok(())
}

/// Renders the report text. Pure: identical inputs produce identical output.
pub fn format_message(snapshot: &TradingSnapshot, generated_at: DateTime<Local>) -> String {
    format!(
        "📈 <b>Ежедневный отчет по ценной бумаге</b>\n\
         \n\
         ━━━━━━━━━━━━━━━━━━━━\n\
         📅 <b>Дата последней сделки:</b> {date}\n\
         💰 <b>Текущая цена:</b> {price} BYN\n\
         📊 <b>Изменение цены:</b> +{change} BYN\n\
         📈 <b>Процент изменения:</b> +{change_percent}\n\
         \n\
         🧾 <b>Итоги торгов (вторич.):</b>\n\
         • мин.: {min}\n\
         • макс.: {max}\n\
         • срвз: {avg}\n\
         ━━━━━━━━━━━━━━━━━━━━\n\
         \n\
         🔗 <a href=\"{url}\">Источник: БВФБ</a>\n\
         \n\
         ⏰ Сформировано: {generated_at}",
        date = snapshot.date,
        price = snapshot.price,
        change = snapshot.change,
        change_percent = snapshot.change_percent,
        min = snapshot.secondary.min,
        max = snapshot.secondary.max,
        avg = snapshot.secondary.avg,
        url = bcse::SECURITY_URL,
        generated_at = generated_at.format("%d.%m.%Y, %H:%M:%S"),
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_timestamp() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 12, 16, 14, 30, 45).unwrap()
    }

    #[test]
    fn test_format_message_is_deterministic() {
        let snapshot = TradingSnapshot::fallback();

        let first = format_message(&snapshot, fixed_timestamp());
        let second = format_message(&snapshot, fixed_timestamp());

        assert_eq!(first, second);
    }

    #[test]
    fn test_format_message_renders_fallback_snapshot() {
        let message = format_message(&TradingSnapshot::fallback(), fixed_timestamp());

        assert_eq!(
            message,
            "📈 <b>Ежедневный отчет по ценной бумаге</b>\n\
             \n\
             ━━━━━━━━━━━━━━━━━━━━\n\
             📅 <b>Дата последней сделки:</b> 16.12.2025\n\
             💰 <b>Текущая цена:</b> 41.40 BYN\n\
             📊 <b>Изменение цены:</b> +9.40 BYN\n\
             📈 <b>Процент изменения:</b> +29.37%\n\
             \n\
             🧾 <b>Итоги торгов (вторич.):</b>\n\
             • мин.: 41.40\n\
             • макс.: 41.40\n\
             • срвз: 41.40\n\
             ━━━━━━━━━━━━━━━━━━━━\n\
             \n\
             🔗 <a href=\"https://www.bcse.by/stock/securitydirectory/100345505/5-200-01-3593\">Источник: БВФБ</a>\n\
             \n\
             ⏰ Сформировано: 16.12.2025, 14:30:45"
        );
    }

    #[test]
    fn test_format_message_links_the_source_page() {
        let snapshot = TradingSnapshot {
            price: "41.55".to_string(),
            ..TradingSnapshot::fallback()
        };
        let message = format_message(&snapshot, fixed_timestamp());

        assert!(message.contains(bcse::SECURITY_URL));
        assert!(message.contains("41.55 BYN"));
    }
}
