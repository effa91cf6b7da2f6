pub mod companies;

pub use companies::{companies_create, companies_delete, companies_list, companies_update};
