use utxo_bitcoins::{prelude::*, types::Script};

const KEY_A: &str = "0241dcd64b5f4a039fc339a16300a833a883b218909f2ebcaf3906651c76842c45";
const KEY_B: &str = "036db397495fa03fe263ee4021b77c49496e5c7db8266e6e33a03d5b3a370c3d6d";
const KEY_B_UNCOMPRESSED: &str = "046db397495fa03fe263ee4021b77c49496e5c7db8266e6e33a03d5b3a370c3d6d744a863b14de2457d82bee322416523e336530760c4533aee980f4a4cdb9a98d";
const SIG_X: &str = "ed59aeecb1ac0baf31b6d84bb51c060dbbc3e0321eeee6fadebf073099629a9a7247306451fd78488b1aae38391da6caa72b52d2e6d9359f9c682efcbf388b07";
const SIG_Y: &str = "00325bf907137bb6ed0a84d78c12f9680dd57ae374f45d43cdc7068abf56f5b93c08bc1f9cd1e91e7a496da2ecd54597b11ae0dda4f6672235853c0cef6bf8b4";
const ONE_OF_TWO: &str = "51210241dcd64b5f4a039fc339a16300a833a883b218909f2ebcaf3906651c76842c4521036db397495fa03fe263ee4021b77c49496e5c7db8266e6e33a03d5b3a370c3d6d52ae";

const VARIANTS: [BuilderVariant; 2] = [BuilderVariant::Native, BuilderVariant::Library];

fn utxo(height: u64, txid: &str, idx: u32, amount: u64) -> UnspentOutput {
    UnspentOutput::from_explorer(height, txid, idx, amount).unwrap()
}

fn sig(compact: &str, key: &str) -> SignatureInfo {
    SignatureInfo::positional(hex::decode(compact).unwrap(), hex::decode(key).unwrap())
}

fn hashes_hex(hashes: &[SighashDigest]) -> Vec<String> {
    hashes.iter().map(|h| hex::encode(h.0)).collect()
}

fn redeem_script() -> Script {
    Script::new(hex::decode(ONE_OF_TWO).unwrap())
}

struct Fixture {
    params: &'static NetworkParams,
    config: BuilderConfig,
    wallet_script: Option<LockingScript>,
    source: &'static str,
    utxos: Vec<UnspentOutput>,
    request: SendRequest,
    signatures: Vec<SignatureInfo>,
    hashes: Vec<&'static str>,
    tx: &'static str,
}

impl Fixture {
    fn run(&self, variant: BuilderVariant) {
        let store = UnspentOutputStore::default();
        store.update(self.source, self.utxos.clone());

        let config = self.config.clone().with_variant(variant);
        let mut builder = TransactionBuilder::new(self.params, &store, config);
        if let Some(script) = &self.wallet_script {
            builder = builder.with_wallet_script(script.clone());
        }
        assert_eq!(builder.state(), BuildState::Empty);

        let hashes = builder.build_for_sign(&self.request).unwrap();
        assert_eq!(hashes_hex(&hashes), self.hashes, "{:?}", variant);
        assert_eq!(builder.state(), BuildState::HashesEmitted);

        let tx = builder.build_for_send(&self.request, &self.signatures).unwrap();
        assert_eq!(hex::encode(tx), self.tx, "{:?}", variant);
        assert_eq!(builder.state(), BuildState::Serialized);
        assert_eq!(builder.spent_outpoints().len(), self.hashes.len());
    }

    fn run_all(&self) {
        for variant in VARIANTS.iter() {
            self.run(*variant);
        }
    }
}

fn bch_fixture() -> Fixture {
    let source = "bitcoincash:qrpgfcqrnqvp33vsex0clktvae2pqjfxnyxq0ml0zc";
    Fixture {
        params: &BITCOIN_CASH,
        config: BuilderConfig::default(),
        wallet_script: None,
        source,
        utxos: vec![utxo(
            650_000,
            "54d64ab1d97b15af31f5a926db433a855ececdd1ed25f5c18376fecb648aa32c",
            1,
            99_647_214,
        )],
        request: SendRequest::new(
            source,
            "bitcoincash:qqcf5rrwlgx609ndt3pdck5j3a467rj8aucwvn9uvv",
            99_347_502,
            FeePolicy::Exact(299_712),
        ),
        signatures: vec![sig(SIG_X, KEY_A)],
        hashes: vec!["c5add44d795236fcc82b23b711d6e72cc2645e686fded8ee0cf6e8c184d8a6a6"],
        tx: "02000000012ca38a64cbfe7683c1f525edd1cdce5e853a43db26a9f531af157bd9b14ad654010000006b483045022100ed59aeecb1ac0baf31b6d84bb51c060dbbc3e0321eeee6fadebf073099629a9a02207247306451fd78488b1aae38391da6caa72b52d2e6d9359f9c682efcbf388b0741210241dcd64b5f4a039fc339a16300a833a883b218909f2ebcaf3906651c76842c45ffffffff012eeceb05000000001976a914309a0c6efa0da7966d5c42dc5a928f6baf0e47ef88ac00000000",
    }
}

fn p2wpkh_fixture(ordering: Ordering) -> Fixture {
    let source = "bc1qxzdqcmh6pknevm2ugtw94y50dwhsu3l0p5tg63";
    let utxos = vec![
        utxo(
            800_100,
            "8b907ad6ee8c6b1d25375ce9696089fec400851ca46260927d04892ec88807ef",
            0,
            39_920_000,
        ),
        utxo(
            800_000,
            "cffea3f46c73d61c6ed1296494b3c85e9f498629a32d67367a0d9e1bafdd05df",
            1,
            12_210_000,
        ),
    ];
    let request = SendRequest::new(
        source,
        "bc1q67dmfccnax59247kshfkxcq6qr53wmwqfa4s28cupktj2amf5jus2j6qvt",
        40_000_000,
        FeePolicy::Exact(4_641),
    )
    .with_sequence(SequencePolicy::Replaceable(0xffff_fffa))
    .with_ordering(ordering);

    let (signatures, hashes, tx) = match ordering {
        Ordering::Selection => (
            vec![sig(SIG_X, KEY_B_UNCOMPRESSED), sig(SIG_Y, KEY_B_UNCOMPRESSED)],
            vec![
                "8272779353ead7848859916dfa4e6ed4daa54989ca6258566d0ffedec2002400",
                "5624db10bc172d5300c03eb50e3a1b2947cdce4c89f483994df07bb81eb97ea8",
            ],
            "01000000000102df05ddaf1b9e0d7a36672da32986499f5ec8b3946429d16e1cd6736cf4a3fecf0100000000faffffffef0788c82e89047d926062a41c8500c4fe896069e95c37251d6b8ceed67a908b0000000000faffffff02005a620200000000220020d79bb4e313e9a85557d685d363601a00e9176dc04f6b051f1c0d97257769a4b9af04b90000000000160014309a0c6efa0da7966d5c42dc5a928f6baf0e47ef02483045022100ed59aeecb1ac0baf31b6d84bb51c060dbbc3e0321eeee6fadebf073099629a9a02207247306451fd78488b1aae38391da6caa72b52d2e6d9359f9c682efcbf388b070121036db397495fa03fe263ee4021b77c49496e5c7db8266e6e33a03d5b3a370c3d6d02463043021f325bf907137bb6ed0a84d78c12f9680dd57ae374f45d43cdc7068abf56f5b902203c08bc1f9cd1e91e7a496da2ecd54597b11ae0dda4f6672235853c0cef6bf8b40121036db397495fa03fe263ee4021b77c49496e5c7db8266e6e33a03d5b3a370c3d6d00000000",
        ),
        Ordering::Bip69 => (
            vec![sig(SIG_Y, KEY_B_UNCOMPRESSED), sig(SIG_X, KEY_B_UNCOMPRESSED)],
            vec![
                "524aa09fdd0f8b414e2c66c650c9853c020963d56b84ce3049fddd56869e5eea",
                "ca0f139ad25974812c294544229ece7d3293b9e53680ac63b83b3bc1b2fc22bd",
            ],
            "01000000000102ef0788c82e89047d926062a41c8500c4fe896069e95c37251d6b8ceed67a908b0000000000faffffffdf05ddaf1b9e0d7a36672da32986499f5ec8b3946429d16e1cd6736cf4a3fecf0100000000faffffff02af04b90000000000160014309a0c6efa0da7966d5c42dc5a928f6baf0e47ef005a620200000000220020d79bb4e313e9a85557d685d363601a00e9176dc04f6b051f1c0d97257769a4b902463043021f325bf907137bb6ed0a84d78c12f9680dd57ae374f45d43cdc7068abf56f5b902203c08bc1f9cd1e91e7a496da2ecd54597b11ae0dda4f6672235853c0cef6bf8b40121036db397495fa03fe263ee4021b77c49496e5c7db8266e6e33a03d5b3a370c3d6d02483045022100ed59aeecb1ac0baf31b6d84bb51c060dbbc3e0321eeee6fadebf073099629a9a02207247306451fd78488b1aae38391da6caa72b52d2e6d9359f9c682efcbf388b070121036db397495fa03fe263ee4021b77c49496e5c7db8266e6e33a03d5b3a370c3d6d00000000",
        ),
    };

    Fixture {
        params: &BITCOIN,
        config: BuilderConfig::default(),
        wallet_script: None,
        source,
        utxos,
        request,
        signatures,
        hashes,
        tx,
    }
}

fn p2pkh_fixture() -> Fixture {
    let source = "1JjXGY5KEcbT35uAo6P9A7DebBn4DXnjdQ";
    Fixture {
        params: &BITCOIN,
        config: BuilderConfig::default(),
        wallet_script: None,
        source,
        utxos: vec![
            utxo(
                700_100,
                "95a2a684826d57cb5b58ebe5ccfcf4d0cb515326586cd048c1dc874aeef5cf7b",
                3,
                50_000,
            ),
            utxo(
                700_000,
                "e5e2bc19087051a62be57481d707e1dde11ffcb9a4f7708dabe316ace77560ff",
                0,
                30_000,
            ),
        ],
        request: SendRequest::new(
            source,
            "bc1qxzdqcmh6pknevm2ugtw94y50dwhsu3l0p5tg63",
            60_000,
            FeePolicy::Exact(2_260),
        ),
        signatures: vec![sig(SIG_X, KEY_A), sig(SIG_Y, KEY_A)],
        hashes: vec![
            "a91dca9e3530150e48590ac841b06ea27752e307563998c9bb0b896e72ff91a9",
            "2d53b190c8cfe08131d949ab2757a19631d3f94a9ee84df9afaedd47b2761712",
        ],
        tx: "0100000002ff6075e7ac16e3ab8d70f7a4b9fc1fe1dde107d78174e52ba651700819bce2e5000000006b483045022100ed59aeecb1ac0baf31b6d84bb51c060dbbc3e0321eeee6fadebf073099629a9a02207247306451fd78488b1aae38391da6caa72b52d2e6d9359f9c682efcbf388b0701210241dcd64b5f4a039fc339a16300a833a883b218909f2ebcaf3906651c76842c45ffffffff7bcff5ee4a87dcc148d06c58265351cbd0f4fccce5eb585bcb576d8284a6a2950300000069463043021f325bf907137bb6ed0a84d78c12f9680dd57ae374f45d43cdc7068abf56f5b902203c08bc1f9cd1e91e7a496da2ecd54597b11ae0dda4f6672235853c0cef6bf8b401210241dcd64b5f4a039fc339a16300a833a883b218909f2ebcaf3906651c76842c45ffffffff0260ea000000000000160014309a0c6efa0da7966d5c42dc5a928f6baf0e47ef4c450000000000001976a914c284e003981818c590c99f8fd96cee541049269988ac00000000",
    }
}

fn p2sh_fixture() -> Fixture {
    let (source, locking) = LockingScriptBuilder::new(&BITCOIN)
        .encode_redeem_script(&redeem_script(), ScriptType::SH)
        .unwrap();
    assert_eq!(source, "3KdtzhuDdMjuAu4Sot87Tpn6VuWkxuiSoC");
    let source = "3KdtzhuDdMjuAu4Sot87Tpn6VuWkxuiSoC";
    Fixture {
        params: &BITCOIN,
        config: BuilderConfig::default()
            .with_version(2)
            .with_sequence(SequencePolicy::rbf()),
        wallet_script: Some(locking),
        source,
        utxos: vec![utxo(
            710_000,
            "6f7dddb8f18a1b9b685414afeca0c17a296005519c06c9593885860a025308f6",
            2,
            152_000,
        )],
        request: SendRequest::new(
            source,
            "15Ryyh2H9mVWurx7xv2fuP72HxqLRHbNnF",
            150_000,
            FeePolicy::Exact(2_000),
        ),
        signatures: vec![sig(SIG_X, KEY_A)],
        hashes: vec!["a0d530be6d4f8ded1332d3a5c5362059b5d228ce5e01002e568b43fc545ff28f"],
        tx: "0200000001f60853020a86853859c9069c510560297ac1a0ecaf1454689b1b8af1b8dd7d6f020000009200483045022100ed59aeecb1ac0baf31b6d84bb51c060dbbc3e0321eeee6fadebf073099629a9a02207247306451fd78488b1aae38391da6caa72b52d2e6d9359f9c682efcbf388b07014751210241dcd64b5f4a039fc339a16300a833a883b218909f2ebcaf3906651c76842c4521036db397495fa03fe263ee4021b77c49496e5c7db8266e6e33a03d5b3a370c3d6d52aefdffffff01f0490200000000001976a914309a0c6efa0da7966d5c42dc5a928f6baf0e47ef88ac00000000",
    }
}

fn p2wsh_fixture() -> Fixture {
    let (_, locking) = LockingScriptBuilder::new(&BITCOIN)
        .encode_redeem_script(&redeem_script(), ScriptType::WSH)
        .unwrap();
    let source = "bc1qqx6nlvcawlkzzk3rtkkete3se3utd30f96ywmcg4fkrfh2zqjr5scwp0u4";
    Fixture {
        params: &BITCOIN,
        config: BuilderConfig::default().with_version(2),
        wallet_script: Some(locking),
        source,
        utxos: vec![utxo(
            720_000,
            "e6f9b8e91d42692cf0b8a8c219ce0a5e1206efab82e09a87ec55497906889eba",
            0,
            260_000,
        )],
        request: SendRequest::new(
            source,
            "15Ryyh2H9mVWurx7xv2fuP72HxqLRHbNnF",
            250_000,
            FeePolicy::Exact(10_000),
        ),
        signatures: vec![sig(SIG_Y, KEY_B)],
        hashes: vec!["6b5093a0aebceb32709cde415b2e4f4c33bf6bc7c53b04254f4d8b531c7e7d58"],
        tx: "02000000000101ba9e8806794955ec879ae082abef06125e0ace19c2a8b8f02c69421de9b8f9e60000000000ffffffff0190d00300000000001976a914309a0c6efa0da7966d5c42dc5a928f6baf0e47ef88ac0300463043021f325bf907137bb6ed0a84d78c12f9680dd57ae374f45d43cdc7068abf56f5b902203c08bc1f9cd1e91e7a496da2ecd54597b11ae0dda4f6672235853c0cef6bf8b4014751210241dcd64b5f4a039fc339a16300a833a883b218909f2ebcaf3906651c76842c4521036db397495fa03fe263ee4021b77c49496e5c7db8266e6e33a03d5b3a370c3d6d52ae00000000",
    }
}

fn ltc_p2wpkh_fixture() -> Fixture {
    let source = "ltc1qc2zwqqucrqvvtyxfn78ajm8w2sgyjf5efy0t9t";
    Fixture {
        params: &LITECOIN,
        config: BuilderConfig::default(),
        wallet_script: None,
        source,
        utxos: vec![utxo(
            2_500_000,
            "7540fccc364804c134ca5e9dd1fb51b32a55f5165aece4c190570e663250939d",
            0,
            1_000_000,
        )],
        request: SendRequest::new(
            source,
            "LPewEuL7ERjaAfeH941yBQAnWBCccech7w",
            600_000,
            FeePolicy::Exact(1_000),
        ),
        signatures: vec![sig(SIG_X, KEY_A)],
        hashes: vec!["f1d9d65238d1df7ca478e98bcc54d627c1f9e744d9c1870c93bab359e5619083"],
        tx: "010000000001019d935032660e5790c1e4ec5a16f5552ab351fbd19d5eca34c1044836ccfc40750000000000ffffffff02c0270900000000001976a914309a0c6efa0da7966d5c42dc5a928f6baf0e47ef88ac9816060000000000160014c284e003981818c590c99f8fd96cee541049269902483045022100ed59aeecb1ac0baf31b6d84bb51c060dbbc3e0321eeee6fadebf073099629a9a02207247306451fd78488b1aae38391da6caa72b52d2e6d9359f9c682efcbf388b0701210241dcd64b5f4a039fc339a16300a833a883b218909f2ebcaf3906651c76842c4500000000",
    }
}

fn doge_p2pkh_fixture() -> Fixture {
    let source = "DNscoo1xY2Vja65mXgNhhsPFUKWMa7NLEb";
    Fixture {
        params: &DOGECOIN,
        config: BuilderConfig::default(),
        wallet_script: None,
        source,
        utxos: vec![
            utxo(
                4_100_000,
                "81d9fe06b04c2219af57889bc2b408d5e4b442b1919e2555a24bb937c3f06e24",
                0,
                1_000_000_000,
            ),
            utxo(
                4_000_000,
                "66980b6ea64eda5f209d36ed593fab03b325501ea3e8f273f83ae7833f956707",
                1,
                5_000_000_000,
            ),
        ],
        request: SendRequest::new(
            source,
            "D9a5WwxvTBPoSs8ihW2ET9GdB6Zdq5GAkh",
            2_000_000_000,
            FeePolicy::Exact(100_000_000),
        ),
        signatures: vec![sig(SIG_Y, KEY_A)],
        hashes: vec!["f964a8173d3d38fd5e6d598ec9cb10a8fdab34b5fb2ad592a5c740e6dca3e4ee"],
        tx: "01000000010767953f83e73af873f2e8a31e5025b303ab3f59ed369d205fda4ea66e0b98660100000069463043021f325bf907137bb6ed0a84d78c12f9680dd57ae374f45d43cdc7068abf56f5b902203c08bc1f9cd1e91e7a496da2ecd54597b11ae0dda4f6672235853c0cef6bf8b401210241dcd64b5f4a039fc339a16300a833a883b218909f2ebcaf3906651c76842c45ffffffff0200943577000000001976a914309a0c6efa0da7966d5c42dc5a928f6baf0e47ef88ac007ddaac000000001976a914c284e003981818c590c99f8fd96cee541049269988ac00000000",
    }
}

#[test]
fn it_builds_bch_cashaddr_p2pkh() {
    bch_fixture().run_all();
}

#[test]
fn it_builds_btc_p2wpkh_in_selection_order() {
    p2wpkh_fixture(Ordering::Selection).run_all();
}

#[test]
fn it_builds_btc_p2wpkh_in_bip69_order() {
    p2wpkh_fixture(Ordering::Bip69).run_all();
}

#[test]
fn it_builds_btc_p2pkh_with_change() {
    p2pkh_fixture().run_all();
}

#[test]
fn it_builds_p2sh_one_of_two() {
    p2sh_fixture().run_all();
}

#[test]
fn it_builds_p2wsh_one_of_two() {
    p2wsh_fixture().run_all();
}

#[test]
fn it_builds_ltc_p2wpkh() {
    ltc_p2wpkh_fixture().run_all();
}

#[test]
fn it_builds_doge_p2pkh_from_the_oldest_output() {
    doge_p2pkh_fixture().run_all();
}

#[test]
fn it_accepts_signatures_matched_by_hash() {
    let mut fixture = p2pkh_fixture();
    for (info, hash) in fixture.signatures.iter_mut().zip(fixture.hashes.iter()) {
        info.hash = hex::decode(hash).unwrap();
    }
    fixture.run_all();
}

#[test]
fn it_rejects_send_before_sign() {
    let fixture = bch_fixture();
    let store = UnspentOutputStore::default();
    store.update(fixture.source, fixture.utxos.clone());
    let mut builder = TransactionBuilder::new(fixture.params, &store, BuilderConfig::default());

    let err = builder
        .build_for_send(&fixture.request, &fixture.signatures)
        .unwrap_err();
    assert!(matches!(err, BuildError::NotPrepared));
    assert_eq!(err.kind(), ErrorKind::SignatureMismatch);

    // a different request is not prepared either
    builder.build_for_sign(&fixture.request).unwrap();
    let other = SendRequest {
        amount: fixture.request.amount - 1,
        ..fixture.request.clone()
    };
    assert!(matches!(
        builder.build_for_send(&other, &fixture.signatures),
        Err(BuildError::NotPrepared)
    ));
    assert_eq!(builder.state(), BuildState::HashesEmitted);
}

#[test]
fn it_rejects_mismatched_signatures() {
    let fixture = p2pkh_fixture();
    let store = UnspentOutputStore::default();
    store.update(fixture.source, fixture.utxos.clone());

    for variant in VARIANTS.iter() {
        let config = BuilderConfig::default().with_variant(*variant);
        let mut builder = TransactionBuilder::new(fixture.params, &store, config);
        builder.build_for_sign(&fixture.request).unwrap();

        let too_few = &fixture.signatures[..1];
        match builder.build_for_send(&fixture.request, too_few) {
            Err(BuildError::SignatureMismatch(SignatureError::Count { expected: 2, got: 1 })) => {}
            other => panic!("expected count mismatch, got {:?}", other),
        }

        let mut wrong_hash = fixture.signatures.clone();
        wrong_hash[1].hash = hex::decode(fixture.hashes[0]).unwrap();
        match builder.build_for_send(&fixture.request, &wrong_hash) {
            Err(BuildError::SignatureMismatch(SignatureError::HashMismatch { index: 1 })) => {}
            other => panic!("expected hash mismatch, got {:?}", other),
        }

        let mut wrong_key = fixture.signatures.clone();
        wrong_key[0].public_key = hex::decode(KEY_B).unwrap();
        let err = builder
            .build_for_send(&fixture.request, &wrong_key)
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::SignatureMismatch(SignatureError::PublicKeyMismatch { index: 0 })
        ));
        assert_eq!(err.kind(), ErrorKind::SignatureMismatch);
        assert_eq!(builder.state(), BuildState::HashesEmitted);
    }
}

#[test]
fn it_normalizes_high_s_signatures() {
    let mut fixture = bch_fixture();
    fixture.signatures = vec![sig(
        "ed59aeecb1ac0baf31b6d84bb51c060dbbc3e0321eeee6fadebf073099629a9a8db8cf9bae0287b774e551c7c6e2593413838a13c86f6a9c236a2f9010fdb63a",
        KEY_A,
    )];
    fixture.run_all();
}

#[test]
fn it_reports_insufficient_funds() {
    let fixture = bch_fixture();
    let store = UnspentOutputStore::default();
    store.update(fixture.source, fixture.utxos.clone());
    let mut builder = TransactionBuilder::new(fixture.params, &store, BuilderConfig::default());

    let request = SendRequest::new(
        fixture.source,
        &fixture.request.destination,
        99_647_215,
        FeePolicy::Exact(0),
    );
    let err = builder.build_for_sign(&request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
    assert!(matches!(
        err,
        BuildError::Selection(SelectionError::InsufficientFunds {
            available: 99_647_214,
            required: 99_647_215,
        })
    ));
    assert_eq!(builder.state(), BuildState::Empty);
    assert!(builder.plan().is_none());
}

#[test]
fn it_reports_address_errors() {
    let store = UnspentOutputStore::default();
    let mut builder = TransactionBuilder::new(&BITCOIN, &store, BuilderConfig::default());
    let source = "1JjXGY5KEcbT35uAo6P9A7DebBn4DXnjdQ";

    let cases = [
        // corrupted checksum
        (source, "1JjXGY5KEcbT35uAo6P9A7DebBn4DXnjdR", ErrorKind::AddressFormat),
        // another network
        (source, "ltc1qc2zwqqucrqvvtyxfn78ajm8w2sgyjf5efy0t9t", ErrorKind::AddressFormat),
        (source, "myFUZbAJ3e2hpCNnWfMWz2RyTBNm7vdnSQ", ErrorKind::AddressFormat),
        // taproot pays, but cannot be spent from
        (
            "bc1p0xlxvlhemja6c4dqv22uapctqupfhlxm9h8z3k2e72q4k9hcz7vqzk5jj0",
            source,
            ErrorKind::UnsupportedScriptType,
        ),
        // no redeem script registered
        (
            "3KdtzhuDdMjuAu4Sot87Tpn6VuWkxuiSoC",
            source,
            ErrorKind::UnsupportedScriptType,
        ),
    ];
    for (from, to, kind) in cases.iter() {
        let request = SendRequest::new(from, to, 10_000, FeePolicy::Exact(1_000));
        let err = builder.build_for_sign(&request).unwrap_err();
        assert_eq!(err.kind(), *kind, "{} -> {}: {}", from, to, err);
    }
}

#[test]
fn it_skips_outputs_locked_by_other_scripts() {
    let fixture = bch_fixture();
    let store = UnspentOutputStore::default();
    let foreign = utxo(
        1,
        "1111111111111111111111111111111111111111111111111111111111111111",
        0,
        500_000_000,
    )
    .with_script(LockingScriptBuilder::new(&BITCOIN_CASH)
        .decode(&fixture.request.destination)
        .unwrap()
        .1
        .script_pubkey);
    let mut utxos = fixture.utxos.clone();
    utxos.push(foreign);
    store.update(fixture.source, utxos);

    let mut builder = TransactionBuilder::new(fixture.params, &store, BuilderConfig::default());
    let hashes = builder.build_for_sign(&fixture.request).unwrap();
    assert_eq!(hashes_hex(&hashes), fixture.hashes);
}

#[test]
fn it_sends_change_to_the_configured_address() {
    let fixture = p2pkh_fixture();
    let store = UnspentOutputStore::default();
    store.update(fixture.source, fixture.utxos.clone());
    let change = "bc1qc2zwqqucrqvvtyxfn78ajm8w2sgyjf5edc40am";

    let config = BuilderConfig {
        change_address: Some(change.to_owned()),
        ..BuilderConfig::default()
    };
    let mut builder = TransactionBuilder::new(fixture.params, &store, config);
    builder.build_for_sign(&fixture.request).unwrap();
    let plan = builder.plan().unwrap();
    assert_eq!(plan.outputs.len(), 2);
    assert_eq!(plan.outputs[1].value, 17_740);
    assert_eq!(plan.outputs[1].standard_type(), ScriptType::WPKH);

    // the request overrides the config
    let request = fixture.request.clone().with_change(fixture.source);
    builder.build_for_sign(&request).unwrap();
    let plan = builder.plan().unwrap();
    assert_eq!(plan.outputs[1].standard_type(), ScriptType::PKH);
}

#[test]
fn it_removes_spent_outputs_after_broadcast() {
    let fixture = p2pkh_fixture();
    let store = UnspentOutputStore::default();
    store.update(fixture.source, fixture.utxos.clone());

    let mut builder = TransactionBuilder::new(fixture.params, &store, BuilderConfig::default());
    builder.build_for_sign(&fixture.request).unwrap();
    builder
        .build_for_send(&fixture.request, &fixture.signatures)
        .unwrap();

    let spent = builder.spent_outpoints();
    assert_eq!(store.remove(fixture.source, spent.iter()), 2);
    assert_eq!(store.balance(fixture.source), 0);
}
