pub mod arq;
pub mod channel;
pub mod sim;
pub mod trace;

#[cfg(test)]
mod test;
