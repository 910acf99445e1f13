#![no_main]

use libfuzzer_sys::fuzz_target;

use tally_staking::StakingConfig;
use tally_types::Ratio;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    // Whatever parses must print back to the same value.
    if let Ok(ratio) = s.parse::<Ratio>() {
        let printed = ratio.to_string();
        assert_eq!(printed.parse::<Ratio>().ok(), Some(ratio));
    }

    let _ = StakingConfig::from_toml_str(s).map(|c| c.validate());
});
