use pets_core::{PetProvider, ProviderConfig, UriMatch, UriMatcher};

#[test]
fn classifies_registered_shapes() {
    let matcher = UriMatcher::new("content", "com.example.android.pets");

    assert_eq!(
        matcher.classify("content://com.example.android.pets/pets"),
        UriMatch::Collection
    );
    assert_eq!(
        matcher.classify("content://com.example.android.pets/pets/42"),
        UriMatch::Item(42)
    );
    assert_eq!(
        matcher.classify("content://com.example.android.pets/pets/abc"),
        UriMatch::Unmatched
    );
    assert_eq!(
        matcher.classify("content://com.example.android.pets/other"),
        UriMatch::Unmatched
    );
}

#[test]
fn foreign_scheme_or_authority_is_unmatched() {
    let matcher = UriMatcher::new("content", "com.example.android.pets");

    assert_eq!(
        matcher.classify("file://com.example.android.pets/pets"),
        UriMatch::Unmatched
    );
    assert_eq!(
        matcher.classify("content://com.example.other/pets/1"),
        UriMatch::Unmatched
    );
    assert_eq!(matcher.classify(""), UriMatch::Unmatched);
}

#[test]
fn provider_uses_configured_authority() {
    let config = ProviderConfig {
        scheme: "pets".to_string(),
        authority: "shelter.local".to_string(),
        database_path: None,
    };
    let provider = PetProvider::open(&config).unwrap();

    assert_eq!(provider.collection_uri(), "pets://shelter.local/pets");
    assert_eq!(
        provider.classify("pets://shelter.local/pets/7"),
        UriMatch::Item(7)
    );
    assert_eq!(
        provider.classify("content://com.example.android.pets/pets"),
        UriMatch::Unmatched
    );
}
