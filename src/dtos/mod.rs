pub mod contractordtos;
pub mod inspectiondtos;
pub mod userdtos;
