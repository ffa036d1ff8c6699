// src/names.rs
use rand::Rng;

/// `prefix` followed by a random hex suffix, for resources the run creates.
pub fn rand_name(prefix: &str) -> String {
    format!("{}{:08x}", prefix, rand::thread_rng().gen::<u32>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rand_name() {
        let a = rand_name("pool-");
        assert!(a.starts_with("pool-"));
        assert_eq!(a.len(), "pool-".len() + 8);
    }
}
