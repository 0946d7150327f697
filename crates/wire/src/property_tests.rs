// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property tests for the wire codec: whatever goes in over `encode` comes
//! back unchanged through `decode`, for arbitrary requests and results.

use proptest::prelude::*;

use crate::request::Request;
use crate::response::{CommandResult, Response};
use crate::wire::{decode, encode};

fn arb_params() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        any::<i64>().prop_map(serde_json::Value::from),
        "[a-zA-Z0-9_]{0,16}".prop_map(serde_json::Value::from),
    ]
}

proptest! {
    #[test]
    fn request_round_trips_through_encode_decode(
        id in "[a-zA-Z0-9_-]{1,12}",
        cmd in "[a-z]{1,10}\\.[a-zA-Z]{1,10}",
        params in arb_params(),
    ) {
        let request = Request::new(id, cmd, params);
        let bytes = encode(&request).expect("encode failed");
        let decoded: Request = decode(&bytes).expect("decode failed");
        prop_assert_eq!(decoded, request);
    }

    #[test]
    fn command_result_round_trips_through_encode_decode(
        id in "[a-zA-Z0-9_-]{1,12}",
        success in any::<bool>(),
        message in proptest::option::of("[a-zA-Z0-9 ]{0,32}"),
        error in proptest::option::of("[a-zA-Z0-9 ]{0,32}"),
    ) {
        let result = CommandResult { id, success, data: None, message, error };
        let response = Response::Result(result);
        let bytes = encode(&response).expect("encode failed");
        let decoded: Response = decode(&bytes).expect("decode failed");
        prop_assert_eq!(decoded, response);
    }
}
