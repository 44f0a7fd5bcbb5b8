use bkash_tools::{data_objects::SearchTransactionResponse, BkashApiError};
use mockall::mock;
use url::Url;

use crate::{
    errors::ServerError,
    integrations::{bkash::TransactionLookup, sns::SubscriptionConfirmer},
};

mock! {
    pub Lookup {}
    impl TransactionLookup for Lookup {
        async fn search_transaction(&self, trx_id: &str) -> Result<SearchTransactionResponse, BkashApiError>;
    }
}

mock! {
    pub Confirmer {}
    impl SubscriptionConfirmer for Confirmer {
        async fn confirm_subscription(&self, subscribe_url: &Url) -> Result<(), ServerError>;
    }
}
