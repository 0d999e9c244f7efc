pub mod concept;
pub mod fraud;
pub mod lead;
pub mod order;
pub mod session;
pub mod wellness;
