// src/services/pricing.rs

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    common::error::AppError,
    models::catalog::{LicenseType, ProductVariant},
    models::sales::PriceBreakdown,
};

/// Entradas do cálculo de preço de um pedido.
#[derive(Debug, Clone)]
pub struct PricingInput {
    pub base_price_single_user: Decimal,
    pub base_price_multi_user: Decimal,
    pub license_type: LicenseType,
    pub quantity: i32,
    pub customization_amount: Decimal,
    pub discount_percent: Decimal,
    pub tax_percent: Decimal,
}

impl PricingInput {
    pub fn from_variant(
        variant: &ProductVariant,
        license_type: LicenseType,
        quantity: i32,
        customization_amount: Decimal,
        discount_percent: Decimal,
        tax_percent: Decimal,
    ) -> Self {
        Self {
            base_price_single_user: variant.base_price_single_user,
            base_price_multi_user: variant.base_price_multi_user,
            license_type,
            quantity,
            customization_amount,
            discount_percent,
            tax_percent,
        }
    }
}

// Arredondamento monetário: 2 casas, metade para cima
fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Motor de preços: função pura, calculada UMA vez, no lado que persiste.
///
/// Fórmula canônica: o desconto incide sobre base + customização,
/// e o imposto sobre o subtotal já descontado.
pub fn compute(input: &PricingInput) -> Result<PriceBreakdown, AppError> {
    if input.quantity < 1 {
        return Err(AppError::InvalidInput(
            "A quantidade deve ser no mínimo 1.".to_string(),
        ));
    }
    if input.customization_amount < Decimal::ZERO {
        return Err(AppError::InvalidInput(
            "O valor de customização não pode ser negativo.".to_string(),
        ));
    }
    if input.discount_percent < Decimal::ZERO || input.discount_percent > Decimal::ONE_HUNDRED {
        return Err(AppError::InvalidInput(
            "O desconto deve estar entre 0% e 100%.".to_string(),
        ));
    }
    if input.tax_percent < Decimal::ZERO {
        return Err(AppError::InvalidInput(
            "O imposto não pode ser negativo.".to_string(),
        ));
    }

    let base_price = match input.license_type {
        LicenseType::SingleUser => input.base_price_single_user,
        LicenseType::MultiUser => input.base_price_multi_user,
    };

    let base_amount = round2(base_price * Decimal::from(input.quantity));
    let customization_amount = round2(input.customization_amount);
    let taxable_base = base_amount + customization_amount;
    let discount_amount = round2(taxable_base * input.discount_percent / Decimal::ONE_HUNDRED);
    let sub_total = taxable_base - discount_amount;
    let tax_amount = round2(sub_total * input.tax_percent / Decimal::ONE_HUNDRED);
    let total_amount = sub_total + tax_amount;

    Ok(PriceBreakdown {
        base_price,
        base_amount,
        customization_amount,
        discount_percent: input.discount_percent,
        discount_amount,
        sub_total,
        tax_percent: input.tax_percent,
        tax_amount,
        total_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn input(
        base: &str,
        qty: i32,
        customization: &str,
        discount: &str,
        tax: &str,
    ) -> PricingInput {
        PricingInput {
            base_price_single_user: dec(base),
            base_price_multi_user: dec("25000"),
            license_type: LicenseType::SingleUser,
            quantity: qty,
            customization_amount: dec(customization),
            discount_percent: dec(discount),
            tax_percent: dec(tax),
        }
    }

    #[test]
    fn cenario_de_referencia_9000_com_10_de_desconto_e_18_de_imposto() {
        let b = compute(&input("9000", 1, "0", "10", "18")).unwrap();
        assert_eq!(b.base_amount, dec("9000"));
        assert_eq!(b.discount_amount, dec("900"));
        assert_eq!(b.sub_total, dec("8100"));
        assert_eq!(b.tax_amount, dec("1458"));
        assert_eq!(b.total_amount, dec("9558"));
    }

    #[test]
    fn identidades_da_decomposicao_sempre_fecham() {
        let b = compute(&input("1234.56", 3, "199.99", "12.5", "18")).unwrap();
        assert_eq!(b.sub_total, b.base_amount + b.customization_amount - b.discount_amount);
        assert_eq!(b.total_amount, b.sub_total + b.tax_amount);
    }

    #[test]
    fn licenca_multiusuario_usa_o_outro_preco_base() {
        let mut i = input("9000", 2, "0", "0", "0");
        i.license_type = LicenseType::MultiUser;
        let b = compute(&i).unwrap();
        assert_eq!(b.base_price, dec("25000"));
        assert_eq!(b.base_amount, dec("50000"));
    }

    #[test]
    fn arredondamento_e_metade_para_cima() {
        // taxable = 100.05; 10% = 10.005 -> 10.01
        let b = compute(&input("33.35", 3, "0", "10", "0")).unwrap();
        assert_eq!(b.base_amount, dec("100.05"));
        assert_eq!(b.discount_amount, dec("10.01"));
        assert_eq!(b.sub_total, dec("90.04"));
        assert_eq!(b.total_amount, dec("90.04"));
    }

    #[test]
    fn quantidade_zero_e_rejeitada() {
        assert!(matches!(
            compute(&input("9000", 0, "0", "0", "0")),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn desconto_acima_de_100_e_rejeitado() {
        assert!(matches!(
            compute(&input("9000", 1, "0", "101", "0")),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn customizacao_negativa_e_rejeitada() {
        assert!(matches!(
            compute(&input("9000", 1, "-1", "0", "0")),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn imposto_negativo_e_rejeitado() {
        assert!(matches!(
            compute(&input("9000", 1, "0", "0", "-5")),
            Err(AppError::InvalidInput(_))
        ));
    }
}
