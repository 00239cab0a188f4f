//! End-to-end build tests: header resolution, AVP tree assembly, typed
//! encoding, flag defaulting, and failure paths.

use diamsg::{
    parse, Application, AvpDef, AvpPolicy, AvpValue, BuildError, CommandDef, Dictionary,
    IdProvider, MessageBuilder, Node, TypeDef, VendorDef, MAX_AVP_DEPTH,
};

fn dict() -> Dictionary {
    let mut d = Dictionary::new();
    d.add_application(Application { id: 0, name: "Base".to_string() });
    d.add_application(Application { id: 4, name: "Credit-Control".to_string() });

    d.add_command(0, CommandDef { code: 280, name: "Device-Watchdog".to_string() });
    d.add_command(4, CommandDef { code: 272, name: "Credit-Control".to_string() });

    d.add_vendor(0, VendorDef { code: 10415, name: "3GPP".to_string() });

    for (name, parent) in [
        ("OctetString", None),
        ("UTF8String", Some("OctetString")),
        ("DiameterIdentity", Some("UTF8String")),
        ("Address", Some("OctetString")),
        ("Unsigned32", None),
        ("Integer32", None),
        ("Enumerated", Some("Integer32")),
        ("AppId", Some("Unsigned32")),
        ("VendorId", Some("Unsigned32")),
        ("Time", None),
    ] {
        d.add_type(0, TypeDef::new(name, parent));
    }

    d.add_avp(0, AvpDef::new(264, "Origin-Host", Some("DiameterIdentity")));
    d.add_avp(0, AvpDef::new(257, "Host-IP-Address", Some("Address")));
    d.add_avp(0, AvpDef::new(266, "Vendor-Id", Some("VendorId")));
    d.add_avp(0, AvpDef::new(258, "Auth-Application-Id", Some("AppId")));
    d.add_avp(
        0,
        AvpDef::new(275, "Session-Policy", Some("Enumerated"))
            .with_enum("ACCEPT", 1)
            .with_enum("REJECT", 2),
    );
    d.add_avp(
        0,
        AvpDef::new(295, "Termination-Cause", Some("Enumerated"))
            .with_protected(AvpPolicy::MustNot)
            .with_enum("LOGOUT", 1),
    );
    d.add_avp(
        0,
        AvpDef::new(299, "Trace-Data", Some("OctetString"))
            .with_mandatory(AvpPolicy::MustNot),
    );
    d.add_avp(
        0,
        AvpDef::new(701, "MSISDN", Some("OctetString")).with_vendor(10415),
    );
    d.add_avp(0, AvpDef::new(456, "Group-Record", Some("Grouped")));
    d
}

fn header_node() -> Node {
    Node::new("header")
        .attr("applicationId", "0")
        .attr("command", "280")
        .attr("endToEnd", "7")
        .attr("hopByHop", "8")
}

fn build(root: &Node, default_request: Option<bool>) -> Result<diamsg::Message, BuildError> {
    let d = dict();
    let ids = IdProvider::new();
    MessageBuilder::new(&d, &ids).build_message(root, default_request)
}

// ==================== header ====================

#[test]
fn end_to_end_watchdog_scenario() {
    let root = Node::new("message")
        .child(Node::new("header").attr("applicationId", "0").attr("command", "280"))
        .child(Node::new("avp").attr("code", "264").attr("value", "host.example.com"));
    let msg = build(&root, Some(true)).expect("build");

    assert_eq!(msg.header.application_id, 0);
    assert_eq!(msg.header.command_code, 280);
    assert!(msg.header.request);
    assert_eq!(msg.avps.len(), 1);
    let avp = &msg.avps[0];
    assert_eq!(avp.code, 264);
    assert!(avp.mandatory);
    assert_eq!(avp.value, AvpValue::OctetString(b"host.example.com".to_vec()));
}

#[test]
fn header_resolves_symbolic_names() {
    let root = Node::new("message").child(
        Node::new("header")
            .attr("applicationId", "Credit-Control")
            .attr("command", "Credit-Control"),
    );
    let msg = build(&root, None).expect("build");
    assert_eq!(msg.header.application_id, 4);
    assert_eq!(msg.header.command_code, 272);
    assert!(!msg.header.request);
}

#[test]
fn qualified_header_tokens_match_bare_codes() {
    let qualified = Node::new("message").child(
        Node::new("header")
            .attr("applicationId", "Base:0")
            .attr("command", "Wrong-Name:280"),
    );
    let bare = Node::new("message").child(
        Node::new("header").attr("applicationId", "0").attr("command", "280"),
    );
    let a = build(&qualified, None).expect("qualified");
    let b = build(&bare, None).expect("bare");
    assert_eq!(a.header.application_id, b.header.application_id);
    assert_eq!(a.header.command_code, b.header.command_code);
}

#[test]
fn unknown_numeric_codes_are_legal() {
    let root = Node::new("message").child(
        Node::new("header").attr("applicationId", "99").attr("command", "9999"),
    );
    let msg = build(&root, None).expect("build");
    assert_eq!(msg.header.application_id, 99);
    assert_eq!(msg.header.command_code, 9999);
}

#[test]
fn unknown_symbolic_command_fails() {
    let root = Node::new("message").child(
        Node::new("header").attr("applicationId", "0").attr("command", "No-Such-Command"),
    );
    assert!(matches!(
        build(&root, None),
        Err(BuildError::UnknownReference { .. })
    ));
}

#[test]
fn explicit_request_attribute_beats_caller_default() {
    let root = Node::new("message").child(
        Node::new("header")
            .attr("applicationId", "0")
            .attr("command", "280")
            .attr("request", "false"),
    );
    let msg = build(&root, Some(true)).expect("build");
    assert!(!msg.header.request);
}

#[test]
fn header_flags_parse_independently() {
    let root = Node::new("message").child(
        Node::new("header")
            .attr("applicationId", "0")
            .attr("command", "280")
            .attr("proxiable", "true")
            .attr("retransmit", "true"),
    );
    let msg = build(&root, None).expect("build");
    assert!(msg.header.proxiable);
    assert!(msg.header.retransmit);
    assert!(!msg.header.error);
}

#[test]
fn missing_header_section_fails() {
    let root = Node::new("message");
    assert!(matches!(build(&root, None), Err(BuildError::MissingSection)));
}

#[test]
fn missing_application_id_and_command_fail() {
    let root = Node::new("message").child(Node::new("header").attr("command", "280"));
    assert!(matches!(
        build(&root, None),
        Err(BuildError::MissingAttribute { attribute: "applicationId", .. })
    ));
    let root = Node::new("message").child(Node::new("header").attr("applicationId", "0"));
    assert!(matches!(
        build(&root, None),
        Err(BuildError::MissingAttribute { attribute: "command", .. })
    ));
}

#[test]
fn reserved_header_attributes_are_refused() {
    let root = Node::new("message").child(header_node().attr("flags", "0x01"));
    assert!(matches!(
        build(&root, None),
        Err(BuildError::UnsupportedFeature("flags"))
    ));
    let root = Node::new("message").child(header_node().attr("version", "1"));
    assert!(matches!(
        build(&root, None),
        Err(BuildError::UnsupportedFeature("version"))
    ));
}

#[test]
fn correlation_ids_use_attributes_or_allocator() {
    let root = Node::new("message").child(header_node());
    let msg = build(&root, None).expect("build");
    assert_eq!(msg.header.end_to_end, 7);
    assert_eq!(msg.header.hop_by_hop, 8);

    let d = dict();
    let ids = IdProvider::starting_at(100);
    let builder = MessageBuilder::new(&d, &ids);
    let bare = Node::new("message").child(
        Node::new("header").attr("applicationId", "0").attr("command", "280"),
    );
    let msg = builder.build_message(&bare, None).expect("build");
    assert_eq!(msg.header.end_to_end, 100);
    assert_eq!(msg.header.hop_by_hop, 101);
    let again = builder.build_message(&bare, None).expect("build");
    assert_ne!(again.header.end_to_end, msg.header.end_to_end);
}

// ==================== avp tree ====================

#[test]
fn state_false_omits_avp_before_any_validation() {
    // the node is otherwise invalid (no code, no value): state wins
    let root = Node::new("message")
        .child(header_node())
        .child(Node::new("avp").attr("state", "false"));
    let msg = build(&root, None).expect("build");
    assert!(msg.avps.is_empty());
}

#[test]
fn state_true_still_requires_code() {
    let root = Node::new("message")
        .child(header_node())
        .child(Node::new("avp").attr("state", "true").attr("value", "x"));
    assert!(matches!(
        build(&root, None),
        Err(BuildError::MissingAttribute { attribute: "code", .. })
    ));
}

#[test]
fn missing_value_on_leaf_fails() {
    let root = Node::new("message")
        .child(header_node())
        .child(Node::new("avp").attr("code", "264"));
    assert!(matches!(
        build(&root, None),
        Err(BuildError::MissingAttribute { attribute: "value", .. })
    ));
}

#[test]
fn grouped_avp_ignores_value_attribute() {
    let root = Node::new("message").child(header_node()).child(
        Node::new("avp")
            .attr("code", "456")
            .attr("value", "ignored")
            .child(Node::new("avp").attr("code", "264").attr("value", "inner"))
            .child(Node::new("avp").attr("state", "false")),
    );
    let msg = build(&root, None).expect("build");
    let group = &msg.avps[0];
    assert_eq!(group.code, 456);
    match &group.value {
        AvpValue::Grouped(children) => {
            assert_eq!(children.len(), 1);
            assert_eq!(children[0].code, 264);
        }
        other => panic!("expected grouped payload, got {:?}", other),
    }
}

#[test]
fn avp_resolves_by_name_and_dictionary_supplies_type() {
    let root = Node::new("message").child(header_node()).child(
        Node::new("avp").attr("code", "Origin-Host").attr("value", "h.example"),
    );
    let msg = build(&root, None).expect("build");
    assert_eq!(msg.avps[0].code, 264);
    assert_eq!(msg.avps[0].value, AvpValue::OctetString(b"h.example".to_vec()));
}

#[test]
fn unknown_avp_name_fails_but_raw_code_passes() {
    let root = Node::new("message").child(header_node()).child(
        Node::new("avp").attr("code", "No-Such-Avp").attr("value", "x"),
    );
    assert!(matches!(
        build(&root, None),
        Err(BuildError::UnknownReference { .. })
    ));

    let root = Node::new("message").child(header_node()).child(
        Node::new("avp").attr("code", "99999").attr("value", "x"),
    );
    let msg = build(&root, None).expect("build");
    // unknown code, no type anywhere: OctetString default
    assert_eq!(msg.avps[0].code, 99999);
    assert_eq!(msg.avps[0].value, AvpValue::OctetString(b"x".to_vec()));
}

#[test]
fn explicit_type_overrides_dictionary_type() {
    let root = Node::new("message").child(header_node()).child(
        Node::new("avp")
            .attr("code", "264")
            .attr("type", "Unsigned32")
            .attr("value", "5"),
    );
    let msg = build(&root, None).expect("build");
    assert_eq!(msg.avps[0].value, AvpValue::Unsigned32(5));
}

#[test]
fn unknown_type_name_fails() {
    let root = Node::new("message").child(header_node()).child(
        Node::new("avp").attr("code", "264").attr("type", "NoSuchType").attr("value", "x"),
    );
    assert!(matches!(build(&root, None), Err(BuildError::UnknownType(_))));
}

#[test]
fn address_scenario_encodes_network_bytes() {
    let root = Node::new("message").child(header_node()).child(
        Node::new("avp").attr("code", "257").attr("value", "10.0.0.1"),
    );
    let msg = build(&root, None).expect("build");
    assert_eq!(msg.avps[0].value, AvpValue::OctetString(vec![10, 0, 0, 1]));
}

#[test]
fn enum_label_and_qualified_and_passthrough() {
    for (value, expected) in [("ACCEPT", 1), ("ACCEPT:1", 1), ("Mismatch:1", 1), ("9", 9)] {
        let root = Node::new("message").child(header_node()).child(
            Node::new("avp").attr("code", "275").attr("value", value),
        );
        let msg = build(&root, None).expect("build");
        assert_eq!(msg.avps[0].value, AvpValue::Integer32(expected), "value {}", value);
    }

    let root = Node::new("message").child(header_node()).child(
        Node::new("avp").attr("code", "275").attr("value", "UNDECLARED"),
    );
    assert!(matches!(
        build(&root, None),
        Err(BuildError::UnknownEnumValue { .. })
    ));
}

#[test]
fn vendor_id_value_is_rewritten_from_symbol() {
    let root = Node::new("message").child(header_node()).child(
        Node::new("avp").attr("code", "266").attr("value", "3GPP"),
    );
    let msg = build(&root, None).expect("build");
    assert_eq!(msg.avps[0].value, AvpValue::Unsigned32(10415));
}

#[test]
fn app_id_value_rewriting_is_soft() {
    let root = Node::new("message").child(header_node()).child(
        Node::new("avp").attr("code", "258").attr("value", "Credit-Control"),
    );
    let msg = build(&root, None).expect("build");
    assert_eq!(msg.avps[0].value, AvpValue::Unsigned32(4));
}

#[test]
fn vendor_is_inherited_from_definition_or_explicit() {
    // dictionary definition carries the vendor
    let root = Node::new("message").child(header_node()).child(
        Node::new("avp").attr("code", "MSISDN").attr("vendorId", "10415").attr("value", "48"),
    );
    let msg = build(&root, None).expect("build");
    assert_eq!(msg.avps[0].vendor_id, 10415);

    // no explicit vendorId attribute: inherited from the definition
    let root = Node::new("message").child(header_node()).child(
        Node::new("avp").attr("code", "701").attr("value", "48"),
    );
    let msg = build(&root, None).expect("build");
    assert_eq!(msg.avps[0].vendor_id, 10415);

    // raw numeric vendor unknown to the dictionary is legal
    let root = Node::new("message").child(header_node()).child(
        Node::new("avp").attr("code", "99999").attr("vendorId", "4242").attr("value", "x"),
    );
    let msg = build(&root, None).expect("build");
    assert_eq!(msg.avps[0].vendor_id, 4242);
}

#[test]
fn flag_defaulting_against_policies() {
    // no policies: both default true
    let root = Node::new("message").child(header_node()).child(
        Node::new("avp").attr("code", "264").attr("value", "x"),
    );
    let msg = build(&root, None).expect("build");
    assert!(msg.avps[0].mandatory);
    assert!(msg.avps[0].protected);

    // protected policy mustnot: mandatory default unaffected, protected false
    let root = Node::new("message").child(header_node()).child(
        Node::new("avp").attr("code", "295").attr("value", "LOGOUT"),
    );
    let msg = build(&root, None).expect("build");
    assert!(msg.avps[0].mandatory);
    assert!(!msg.avps[0].protected);

    // mandatory policy mustnot: mandatory default false
    let root = Node::new("message").child(header_node()).child(
        Node::new("avp").attr("code", "299").attr("value", "x"),
    );
    let msg = build(&root, None).expect("build");
    assert!(!msg.avps[0].mandatory);

    // explicit attributes win over policies
    let root = Node::new("message").child(header_node()).child(
        Node::new("avp")
            .attr("code", "299")
            .attr("mandatory", "true")
            .attr("private", "false")
            .attr("value", "x"),
    );
    let msg = build(&root, None).expect("build");
    assert!(msg.avps[0].mandatory);
    assert!(!msg.avps[0].protected);
}

#[test]
fn nesting_beyond_limit_fails() {
    let mut node = Node::new("avp").attr("code", "264").attr("value", "x");
    for _ in 0..(MAX_AVP_DEPTH + 1) {
        node = Node::new("avp").attr("code", "456").child(node);
    }
    let root = Node::new("message").child(header_node()).child(node);
    assert!(matches!(
        build(&root, None),
        Err(BuildError::NestingTooDeep(_))
    ));
}

#[test]
fn builds_are_deterministic() {
    let root = Node::new("message")
        .child(header_node())
        .child(Node::new("avp").attr("code", "264").attr("value", "host.example.com"))
        .child(Node::new("avp").attr("code", "275").attr("value", "ACCEPT"));
    let a = build(&root, Some(true)).expect("a");
    let b = build(&root, Some(true)).expect("b");
    assert_eq!(
        a.to_bytes().expect("bytes a"),
        b.to_bytes().expect("bytes b")
    );
}

#[test]
fn avps_keep_document_order() {
    let root = Node::new("message")
        .child(header_node())
        .child(Node::new("avp").attr("code", "266").attr("value", "3GPP"))
        .child(Node::new("avp").attr("code", "264").attr("value", "x"))
        .child(Node::new("avp").attr("code", "257").attr("value", "10.0.0.1"));
    let msg = build(&root, None).expect("build");
    let codes: Vec<u32> = msg.avps.iter().map(|a| a.code).collect();
    assert_eq!(codes, [266, 264, 257]);
}

// ==================== parse + build ====================

#[test]
fn full_document_round() {
    let src = r#"
message {
    header applicationId="0" command="Device-Watchdog" endToEnd="1" hopByHop="2";
    avp code="Origin-Host" value="host.example.com";
    avp code="456" {
        avp code="275" value="ACCEPT";
    }
}
"#;
    let root = parse(src).expect("parse");
    let msg = build(&root, Some(true)).expect("build");
    assert_eq!(msg.header.command_code, 280);
    assert_eq!(msg.avps.len(), 2);
    let bytes = msg.to_bytes().expect("bytes");
    assert_eq!(bytes.len(), msg.encoded_len());
    assert_eq!(bytes[0], 1); // version
}
