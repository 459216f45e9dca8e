pub mod contractormodel;
pub mod inspectionmodel;
pub mod usermodel;
