use margay_dsl::parse;
#[test]
fn diag() {
    let cases = [
        "@z0((Left z2) & w)",
        "@z0 ((Left z2) & w)",
        "X @z0((Left z2) & w)",
        "(@z0 ↓z2 X @z0((Left z2) & w))",
        // balanced version of the bundled formula (one fewer open paren after @z0)
        "@z0 (((Right z1) & ((Front (G h))|(Front (Front (G h))))) & (((@z0 ↓z2 X @z0 ((Back z2) & (G ! h)))) U ((@z0 ↓z2 X @z0((Left z2) & w)))))",
    ];
    for c in cases {
        match parse(c) {
            Ok(_) => println!("OK : {c}"),
            Err(e) => println!("ERR: {c}\n     {e}"),
        }
    }
}
