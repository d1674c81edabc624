#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(table) = biom_table::Biom::from_json_str(text) {
            let json = table.to_json_string().unwrap();
            let back = biom_table::Biom::from_json_str(&json).unwrap();
            assert_eq!(back.shape(), table.shape());
            assert_eq!(back.get_data_matrix(), table.get_data_matrix());
        }
    }
});
