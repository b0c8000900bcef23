pub mod lookups;
pub mod sanitize;
pub mod submit_payment;
pub mod submit_request;
pub mod validate_qr;

#[cfg(test)]
pub(crate) mod test_support;
