pub mod company_setting_repo;
pub mod entity_repo;

pub use company_setting_repo::CompanySettingRepo;
pub use entity_repo::EntityRepo;
