use proptest::prelude::*;

use tessera_types::{AccountName, Asset, Price, Timestamp};

proptest! {
    /// Converting SCR into SP and back never yields more SCR than went in.
    #[test]
    fn share_conversion_never_creates_value(
        shares in 1i64..1_000_000_000,
        fund in 1i64..1_000_000_000,
        amount in 0i64..1_000_000_000,
    ) {
        let price = Price::share_price(Asset::sp(shares), Asset::scr(fund));
        let sp = price.convert(Asset::scr(amount)).unwrap();
        let back = price.convert(sp).unwrap();
        prop_assert!(back.amount <= amount, "round trip grew {} -> {}", amount, back.amount);
    }

    /// Conversion is monotonic in the input amount.
    #[test]
    fn conversion_is_monotonic(
        shares in 1i64..1_000_000_000,
        fund in 1i64..1_000_000_000,
        a in 0i64..1_000_000_000,
        b in 0i64..1_000_000_000,
    ) {
        let price = Price::share_price(Asset::sp(shares), Asset::scr(fund));
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let lo_sp = price.convert(Asset::scr(lo)).unwrap();
        let hi_sp = price.convert(Asset::scr(hi)).unwrap();
        prop_assert!(lo_sp.amount <= hi_sp.amount);
    }

    /// Conversion equals the exact floor of the rational product.
    #[test]
    fn conversion_matches_floor_division(
        shares in 1i64..1_000_000_000,
        fund in 1i64..1_000_000_000,
        amount in 0i64..1_000_000_000,
    ) {
        let price = Price::share_price(Asset::sp(shares), Asset::scr(fund));
        let sp = price.convert(Asset::scr(amount)).unwrap();
        let expected = (amount as u128 * shares as u128 / fund as u128) as i64;
        prop_assert_eq!(sp.amount, expected);
    }

    /// Add then subtract restores the original amount.
    #[test]
    fn add_sub_inverse(a in -1_000_000_000_000i64..1_000_000_000_000, b in -1_000_000_000_000i64..1_000_000_000_000) {
        let sum = Asset::scr(a).checked_add(Asset::scr(b)).unwrap();
        prop_assert_eq!(sum.checked_sub(Asset::scr(b)).unwrap(), Asset::scr(a));
    }

    /// Display output parses back to the same asset.
    #[test]
    fn display_parses_back(amount in -1_000_000_000_000i64..1_000_000_000_000, sp in any::<bool>()) {
        let asset = if sp { Asset::sp(amount) } else { Asset::scr(amount) };
        let parsed: Asset = asset.to_string().parse().unwrap();
        prop_assert_eq!(parsed, asset);
    }

    /// Names longer than the maximum are never valid.
    #[test]
    fn overlong_names_rejected(name in "[a-z]{17,40}") {
        prop_assert!(!AccountName::new(name).is_valid());
    }

    /// `plus` never moves a timestamp backwards.
    #[test]
    fn timestamp_plus_monotonic(start in any::<u64>(), secs in any::<u64>()) {
        let t = Timestamp::new(start);
        prop_assert!(t.plus(secs) >= t);
    }
}
