//! Pure validation helpers for Brazilian fiscal documents and catalog codes

/// Strip every non-digit character from a document string.
pub fn normalize_document(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn check_digit_mod11(sum: u32) -> u32 {
    let rem = sum % 11;
    if rem < 2 {
        0
    } else {
        11 - rem
    }
}

/// Validate a CPF (individual taxpayer number) by its two check digits.
/// Accepts formatted ("111.444.777-35") or bare ("11144477735") input.
pub fn validate_cpf(input: &str) -> bool {
    let cpf = normalize_document(input);
    if cpf.len() != 11 {
        return false;
    }

    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();

    // Sequences like 111.111.111-11 satisfy the checksum but are invalid
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    let first: u32 = digits[..9]
        .iter()
        .enumerate()
        .map(|(i, &d)| d * (10 - i as u32))
        .sum();
    if digits[9] != check_digit_mod11(first) {
        return false;
    }

    let second: u32 = digits[..10]
        .iter()
        .enumerate()
        .map(|(i, &d)| d * (11 - i as u32))
        .sum();
    digits[10] == check_digit_mod11(second)
}

/// Weighted sum for CNPJ check digits: weights cycle 2..=9 starting from
/// the rightmost digit.
fn cnpj_weighted_sum(digits: &[u32]) -> u32 {
    let mut weight = 2;
    let mut sum = 0;
    for &d in digits.iter().rev() {
        sum += d * weight;
        weight = if weight == 9 { 2 } else { weight + 1 };
    }
    sum
}

/// Validate a CNPJ (company registration number) by its two check digits.
/// Accepts formatted ("11.222.333/0001-81") or bare input.
pub fn validate_cnpj(input: &str) -> bool {
    let cnpj = normalize_document(input);
    if cnpj.len() != 14 {
        return false;
    }

    let digits: Vec<u32> = cnpj.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits[12] != check_digit_mod11(cnpj_weighted_sum(&digits[..12])) {
        return false;
    }
    digits[13] == check_digit_mod11(cnpj_weighted_sum(&digits[..13]))
}

/// Part codes are short uppercase identifiers like "VLV001" or "PST-12":
/// 3 to 20 characters, uppercase letters, digits and dashes, starting with
/// a letter or digit.
pub fn is_valid_part_code(code: &str) -> bool {
    let len_ok = (3..=20).contains(&code.len());
    let charset_ok = code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-');
    let starts_ok = code
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    len_ok && charset_ok && starts_ok
}

/// Minimal email shape check: one "@", non-empty local part, dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_cpf() {
        assert!(validate_cpf("11144477735"));
        assert!(validate_cpf("111.444.777-35"));
    }

    #[test]
    fn test_invalid_cpf() {
        assert!(!validate_cpf("11144477734")); // wrong check digit
        assert!(!validate_cpf("11111111111")); // repeated digits
        assert!(!validate_cpf("1114447773")); // too short
        assert!(!validate_cpf(""));
    }

    #[test]
    fn test_valid_cnpj() {
        assert!(validate_cnpj("11222333000181"));
        assert!(validate_cnpj("11.222.333/0001-81"));
        // seed fixture documents
        assert!(validate_cnpj("12345678000195"));
    }

    #[test]
    fn test_invalid_cnpj() {
        assert!(!validate_cnpj("11222333000182")); // wrong check digit
        assert!(!validate_cnpj("1122233300018")); // too short
        assert!(!validate_cnpj(""));
    }

    #[test]
    fn test_part_codes() {
        assert!(is_valid_part_code("VLV001"));
        assert!(is_valid_part_code("PST-12"));
        assert!(is_valid_part_code("AMT001"));
        assert!(!is_valid_part_code("ab1")); // lowercase
        assert!(!is_valid_part_code("AB")); // too short
        assert!(!is_valid_part_code("-AB1")); // leading dash
        assert!(!is_valid_part_code("A".repeat(21).as_str()));
    }

    #[test]
    fn test_emails() {
        assert!(is_valid_email("admin@autopecas.com"));
        assert!(!is_valid_email("admin"));
        assert!(!is_valid_email("admin@"));
        assert!(!is_valid_email("@autopecas.com"));
        assert!(!is_valid_email("admin@autopecas"));
        assert!(!is_valid_email("a b@autopecas.com"));
    }

    fn cpf_with_check_digits(body: &[u32; 9]) -> String {
        let first: u32 = body
            .iter()
            .enumerate()
            .map(|(i, &d)| d * (10 - i as u32))
            .sum();
        let d10 = check_digit_mod11(first);

        let mut ten: Vec<u32> = body.to_vec();
        ten.push(d10);
        let second: u32 = ten
            .iter()
            .enumerate()
            .map(|(i, &d)| d * (11 - i as u32))
            .sum();
        let d11 = check_digit_mod11(second);

        let mut out: String = body.iter().map(|d| char::from_digit(*d, 10).unwrap()).collect();
        out.push(char::from_digit(d10, 10).unwrap());
        out.push(char::from_digit(d11, 10).unwrap());
        out
    }

    proptest! {
        /// Any 9-digit body with correctly computed check digits passes,
        /// unless it degenerates into a repeated-digit sequence.
        #[test]
        fn prop_computed_check_digits_accepted(body in proptest::array::uniform9(0u32..10)) {
            let cpf = cpf_with_check_digits(&body);
            let repeated = cpf.chars().all(|c| c == cpf.chars().next().unwrap());
            prop_assert_eq!(validate_cpf(&cpf), !repeated);
        }

        /// Mutating the last check digit always invalidates a CPF.
        #[test]
        fn prop_mutated_check_digit_rejected(body in proptest::array::uniform9(0u32..10), bump in 1u32..10) {
            let cpf = cpf_with_check_digits(&body);
            let last = cpf.chars().last().unwrap().to_digit(10).unwrap();
            let mutated_digit = (last + bump) % 10;
            let mut mutated = cpf[..10].to_string();
            mutated.push(char::from_digit(mutated_digit, 10).unwrap());
            prop_assert!(!validate_cpf(&mutated));
        }
    }
}
