#![no_main]

use libfuzzer_sys::fuzz_target;
use remedi::handlers::maven::collect_gav_coordinates;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let result = collect_gav_coordinates(Path::new("pom.xml"), content);

        if let Ok(coordinates) = result {
            for coordinate in &coordinates {
                assert!(
                    !coordinate.group_id.is_empty()
                        || !coordinate.artifact_id.is_empty()
                        || !coordinate.version.is_empty(),
                    "walker must not emit fully empty coordinates"
                );
                assert!(
                    coordinate.key().contains(':'),
                    "coordinate key must be group:artifact"
                );
            }
        }
    }
});
