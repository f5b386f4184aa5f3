//! Built-in command vocabulary.
//!
//! | Command | Output |
//! |---|---|
//! | `echo <args...>` | the arguments joined by single spaces |
//! | `dummy` | nothing |
//! | `gcd <a> <b>` | `GCD of a and b is g` |
//! | `prime <n>` | `Number of primes less than or equal to n is c` |
//! | `sum <n>` | `Sum modulo 1,000,000 of integers up to n is s` |
//!
//! Unknown commands, and known commands missing their arguments, produce
//! no output and no error. `prime` refuses bounds above [`PRIME_LIMIT`],
//! since its sieve allocates one byte per candidate.

use crate::error::CommandError;

/// Modulus applied by `sum`.
pub const SUM_MODULUS: u64 = 1_000_000;

/// Largest bound accepted by `prime`.
pub const PRIME_LIMIT: u64 = 100_000_000;

/// Evaluates a tokenized command and returns the line it prints, if any.
pub fn evaluate(args: &[String]) -> Result<Option<String>, CommandError> {
    let Some((name, rest)) = args.split_first() else {
        return Ok(None);
    };

    match name.as_str() {
        "echo" => Ok(Some(rest.join(" "))),
        "dummy" => Ok(None),
        "gcd" => {
            let [a, b, ..] = rest else {
                return Ok(None);
            };
            let a = parse_number(name, a)?;
            let b = parse_number(name, b)?;
            Ok(Some(format!("GCD of {} and {} is {}", a, b, gcd(a, b))))
        }
        "prime" => {
            let Some(n) = rest.first() else {
                return Ok(None);
            };
            let n = parse_number(name, n)?;
            let bound = n.max(0) as u64;
            if bound > PRIME_LIMIT {
                return Err(CommandError::LimitExceeded {
                    command: name.clone(),
                    argument: n,
                    limit: PRIME_LIMIT,
                });
            }
            Ok(Some(format!(
                "Number of primes less than or equal to {} is {}",
                n,
                count_primes(bound)
            )))
        }
        "sum" => {
            let Some(n) = rest.first() else {
                return Ok(None);
            };
            let n = parse_number(name, n)?;
            Ok(Some(format!(
                "Sum modulo 1,000,000 of integers up to {} is {}",
                n,
                sum_modulo(n.max(0) as u64)
            )))
        }
        _ => Ok(None),
    }
}

fn parse_number(command: &str, argument: &str) -> Result<i64, CommandError> {
    argument.parse().map_err(|_| CommandError::Parse {
        command: command.to_string(),
        argument: argument.to_string(),
    })
}

/// Greatest common divisor by the Euclidean algorithm. `gcd(0, 0) = 0`.
pub fn gcd(a: i64, b: i64) -> u64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Counts primes less than or equal to `n` with a sieve of Eratosthenes.
pub fn count_primes(n: u64) -> u64 {
    if n < 2 {
        return 0;
    }
    let n = n as usize;
    let mut is_prime = vec![true; n + 1];
    is_prime[0] = false;
    is_prime[1] = false;

    let mut i = 2;
    while i * i <= n {
        if is_prime[i] {
            let mut j = i * i;
            while j <= n {
                is_prime[j] = false;
                j += i;
            }
        }
        i += 1;
    }

    is_prime.iter().filter(|&&p| p).count() as u64
}

/// Computes `(1 + 2 + ... + n) mod 1,000,000`.
pub fn sum_modulo(n: u64) -> u64 {
    let n = n as u128;
    ((n * (n + 1) / 2) % SUM_MODULUS as u128) as u64
}
