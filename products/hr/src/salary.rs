//! Payroll math. Plain `f64` in, `f64` out; no rounding is applied.

/// Strict comparison: a salary equal to the threshold is not above it.
pub fn is_above_threshold(salary: f64, threshold: f64) -> bool {
    salary > threshold
}

/// Salary increased by `bonus_percent` percent.
pub fn with_bonus(salary: f64, bonus_percent: f64) -> f64 {
    salary * ((bonus_percent + 100.0) / 100.0)
}

/// Fixed payroll phrase. Integral salaries print without a fraction.
pub fn describe(name: &str, salary: f64) -> String {
    format!("O name é -> {name} e o salário é R$ {salary}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salary_above_threshold() {
        assert!(is_above_threshold(1000.0, 500.0));
    }

    #[test]
    fn salary_not_above_threshold() {
        assert!(!is_above_threshold(400.0, 500.0));
        assert!(!is_above_threshold(500.0, 500.0));
    }

    #[test]
    fn bonus_is_applied_as_percentage() {
        assert_eq!(with_bonus(4500.0, 10.0), 4950.0);
        for salary in [0.0, 1.5, 4500.0, 123_456.78] {
            assert_eq!(with_bonus(salary, 0.0), salary);
        }
    }

    #[test]
    fn phrase_is_byte_exact() {
        assert_eq!(
            describe("Maisson", 4500.0),
            "O name é -> Maisson e o salário é R$ 4500"
        );
        assert_eq!(describe("Ana", 1000.5), "O name é -> Ana e o salário é R$ 1000.5");
    }
}
