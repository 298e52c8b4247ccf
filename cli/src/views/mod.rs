pub mod campaign_create;
pub mod campaign_details;
pub mod campaign_list;
pub mod login;
