pub mod tax;
