use std::path::Path;

use anyhow::{Context, Result};
use bkash_ipn::{IpnConfig, IpnVerifier, NotificationKind, VerifiedNotification};
use bpg_common::Poisha;

pub async fn verify_notification_file(path: &Path) -> Result<()> {
    let body = std::fs::read(path).with_context(|| format!("Could not read {}", path.display()))?;
    let config = IpnConfig::from_env_or_default();
    let verifier = IpnVerifier::from_config(&config)?;
    match verifier.verify(&body).await {
        Ok(verified) => {
            println!("{}", describe(&verified));
            Ok(())
        },
        Err(e) => {
            let advice = if e.is_retryable() { "Try again later." } else { "Do not act on this message." };
            println!("❌️ {} rejected at stage '{}'. {advice}", path.display(), e.stage());
            Err(e.into())
        },
    }
}

fn describe(verified: &VerifiedNotification) -> String {
    let envelope = verified.envelope();
    let mut lines = vec![
        format!("✅️ Authentic {} {}", envelope.kind, envelope.message_id),
        format!("Topic:       {}", envelope.topic_id),
        format!("Issued at:   {}", envelope.issued_at.to_rfc3339()),
        format!("Certificate: {}", verified.certificate().source_url()),
    ];
    match envelope.kind {
        NotificationKind::Notification => match verified.payment_event() {
            Ok(payment) => {
                let amount = payment
                    .amount_in_poisha()
                    .map(|p: Poisha| p.to_string())
                    .unwrap_or_else(|e| format!("{} {} ({e})", payment.amount, payment.currency));
                lines.push(format!("Transaction: {} ({})", payment.trx_id, payment.transaction_status));
                lines.push(format!("Amount:      {amount}"));
                lines.push(format!("Payer:       {}", payment.debit_msisdn));
                if let Some(invoice) = &payment.merchant_invoice_number {
                    lines.push(format!("Invoice:     {invoice}"));
                }
            },
            Err(e) => lines.push(format!("The message is not a payment event. {e}")),
        },
        _ => {
            let url = envelope.subscribe_url.as_deref().unwrap_or("<none>");
            lines.push(format!("SubscribeURL: {url}"));
        },
    }
    lines.join("\n")
}
