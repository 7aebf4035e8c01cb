pub mod amortization;
pub mod purchase;
pub mod rates;
