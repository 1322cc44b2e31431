pub mod company_setting;
