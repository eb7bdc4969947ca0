use jredact_io::JsonArrayStream;
use proptest::prelude::*;
use serde_json::{Map, Value};
use std::io::{BufReader, Cursor};

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-z\\[\\]{},:\"\\\\ ]{0,12}".prop_map(Value::String),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

proptest! {
    #[test]
    fn elements_survive_any_buffer_size(
        elements in prop::collection::vec(arb_value(), 0..8),
        capacity in 1usize..32,
        pretty in any::<bool>(),
    ) {
        let text = if pretty {
            serde_json::to_string_pretty(&elements).unwrap()
        } else {
            serde_json::to_string(&elements).unwrap()
        };
        let reader = BufReader::with_capacity(capacity, Cursor::new(text.clone().into_bytes()));
        let mut stream = JsonArrayStream::new(reader);
        let decoded: Vec<Value> = stream.by_ref().collect::<Result<_, _>>().unwrap();

        prop_assert_eq!(decoded, elements);
        prop_assert_eq!(stream.bytes_read(), text.len() as u64);
        prop_assert!(stream.is_finished());
    }

    #[test]
    fn truncation_never_yields_a_partial_element(
        elements in prop::collection::vec(arb_value(), 1..6),
        cut in any::<prop::sample::Index>(),
    ) {
        let text = serde_json::to_string(&elements).unwrap();
        let cut = cut.index(text.len() - 1);
        let stream = JsonArrayStream::new(Cursor::new(text.as_bytes()[..cut].to_vec()));

        let mut ok = 0;
        let mut failed = false;
        for item in stream {
            match item {
                Ok(value) => {
                    prop_assert!(!failed);
                    prop_assert_eq!(&value, &elements[ok]);
                    ok += 1;
                }
                Err(err) => {
                    prop_assert_eq!(err.exit_code(), 3);
                    failed = true;
                }
            }
        }
        prop_assert!(failed);
        prop_assert!(ok <= elements.len());
    }
}
