pub(crate) mod auth;
pub(crate) mod companies;
pub(crate) mod company_views;
pub(crate) mod dashboards;
pub(crate) mod grants;
pub(crate) mod rules;
pub(crate) mod schedules;
pub(crate) mod securities;
pub(crate) mod stakeholders;
pub(crate) mod support;
pub(crate) mod system;
pub(crate) mod transactions;
