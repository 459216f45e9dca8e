use rand::Rng;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 5;
const ATTEMPTS_PER_LEN: usize = 8;

/// Random base-36 suffix of `len` characters.
pub fn random_suffix(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Draws `prefix` + random suffix until `taken` rejects nothing.
/// The suffix grows by one character every few collisions so the loop
/// always terminates.
pub fn generate_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut len = SUFFIX_LEN;
    loop {
        for _ in 0..ATTEMPTS_PER_LEN {
            let candidate = format!("{}{}", prefix, random_suffix(len));
            if !taken(&candidate) {
                return candidate;
            }
        }
        len += 1;
    }
}
