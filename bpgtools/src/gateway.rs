use anyhow::{anyhow, Context, Result};
use bkash_tools::{
    data_objects::{QueryAgreementRequest, QueryPaymentRequest, SearchTransactionRequest, Token},
    BkashApi,
    BkashConfig,
};
use log::info;
use serde::Serialize;

fn new_bkash_api() -> Result<BkashApi> {
    let config = BkashConfig::new_from_env_or_default();
    if !config.has_credentials() {
        return Err(anyhow!(
            "bKash credentials are not configured. Set BPG_BKASH_USERNAME, BPG_BKASH_PASSWORD, BPG_BKASH_APP_KEY and \
             BPG_BKASH_APP_SECRET."
        ));
    }
    BkashApi::new(config).context("Could not create the bKash client")
}

async fn grant_token(api: &BkashApi) -> Result<Token> {
    let token = api.grant_token().await.context("Could not obtain an access token")?;
    if !token.status.is_success() {
        return Err(anyhow!(
            "The gateway refused to grant a token. {} {}",
            token.status.status_code,
            token.status.status_message
        ));
    }
    Ok(token)
}

fn print_json<T: Serialize>(title: &str, value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("Could not represent {title} as JSON. {e}"));
    println!("{title}\n{json}");
}

pub async fn print_token() -> Result<()> {
    let api = new_bkash_api()?;
    let token = grant_token(&api).await?;
    info!("Token expires in {}s", token.expires_in);
    print_json("Access token", &token);
    Ok(())
}

pub async fn print_payment(payment_id: String) -> Result<()> {
    let api = new_bkash_api()?;
    let token = grant_token(&api).await?;
    let request = QueryPaymentRequest { payment_id };
    let payment = api
        .query_payment(&request, &token)
        .await
        .with_context(|| format!("Could not fetch payment {}", request.payment_id))?;
    print_json(&format!("Payment {}", request.payment_id), &payment);
    Ok(())
}

pub async fn print_agreement(agreement_id: String) -> Result<()> {
    let api = new_bkash_api()?;
    let token = grant_token(&api).await?;
    let request = QueryAgreementRequest { agreement_id };
    let agreement = api
        .query_agreement(&request, &token)
        .await
        .with_context(|| format!("Could not fetch agreement {}", request.agreement_id))?;
    print_json(&format!("Agreement {}", request.agreement_id), &agreement);
    Ok(())
}

pub async fn print_transaction(trx_id: String) -> Result<()> {
    let api = new_bkash_api()?;
    let token = grant_token(&api).await?;
    let request = SearchTransactionRequest { trx_id };
    let record = api
        .search_transaction(&request, &token)
        .await
        .with_context(|| format!("Could not look up transaction {}", request.trx_id))?;
    print_json(&format!("Transaction {}", request.trx_id), &record);
    Ok(())
}
