pub mod doctor;
pub mod turn;
