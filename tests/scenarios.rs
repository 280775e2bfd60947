use hexboot::hal::Memory;
use hexboot::hosted::{Bench, SparseMemory};
use hexboot::{encode_image, Config, Decoder, Event, Jump, Loader};

fn load(input: &[u8]) -> (Bench, Option<Jump>) {
    let mut bench = Bench::default();
    let jump = Loader::new(Config::default()).pump(input.iter().copied(), &mut bench);
    (bench, jump)
}

#[test]
fn data_then_eof_then_go() {
    let (bench, jump) = load(b":0400000000001234AB\r\n:00000001FF\r\ng");

    assert_eq!(bench.memory.writes(), &[(0x0000, 0x3412_0000)]);
    assert_eq!(bench.serial.output(), "34120000\r\n\r--\r\n\n");
    assert_eq!(jump, Some(Jump { entry: 0x8000 }));
}

#[test]
fn unrecognised_record_type_is_skipped() {
    let (bench, jump) = load(b":0400000511223344AA\r\n:0400000000000001FB\r\n");

    assert_eq!(bench.memory.writes(), &[(0x0000, 0x0100_0000)]);
    assert_eq!(jump, None);
}

#[test]
fn checksum_is_sum_of_addresses_and_values() {
    let input = b":100010000102030405060708090A0B0C0D0E0F1068\r\n:0400200011223344AA\r\n";
    let mut decoder = Decoder::new();
    let mut expected = 0u32;

    for &byte in input.iter() {
        if let Some(Event::Word { address, value }) = decoder.push(byte) {
            expected = expected.wrapping_add(address).wrapping_add(value);
        }
    }

    let sum = [
        (0x10u32, 0x0403_0201u32),
        (0x14, 0x0807_0605),
        (0x18, 0x0C0B_0A09),
        (0x1C, 0x100F_0E0D),
        (0x20, 0x4433_2211),
    ]
    .iter()
    .fold(0u32, |acc, &(a, v)| acc.wrapping_add(a).wrapping_add(v));

    assert_eq!(expected, sum);
    assert_eq!(decoder.checksum(), sum);
}

#[test]
fn line_break_discards_partial_word() {
    let (bench, _) = load(b":08000000AABBCCDD1122\r:0400000000000000FC\n");

    assert_eq!(
        bench.memory.writes(),
        &[(0x0000, 0xDDCC_BBAA), (0x0000, 0x0000_0000)]
    );
}

#[test]
fn replaying_a_session_writes_the_same_words() {
    let input = b":020000020001FB\r\n:0C00000000112233445566778899AABBCC\r\n:00000001FF\r\ng";

    let (first, _) = load(input);
    let (second, _) = load(input);

    assert_eq!(first.memory, second.memory);
    assert_eq!(first.memory.writes().len(), 3);
    assert_eq!(first.memory.writes()[0].0, 0x1110);
}

#[test]
fn packed_binary_loads_byte_for_byte() {
    let binary: Vec<u8> = (0u8..102).collect();
    let text = encode_image(0xFFE0, &binary).unwrap();

    assert!(hexboot::lint::check(&text).unwrap().is_clean());

    let (bench, jump) = load(text.as_bytes());
    assert_eq!(jump, None);

    let mut expected = SparseMemory::new();
    let mut padded = binary;
    padded.resize(104, 0);
    let mut address = 0xFFE0;
    for word in padded.chunks(4) {
        expected.write_word(address, u32::from_le_bytes([word[0], word[1], word[2], word[3]]));
        address += 4;
    }

    assert_eq!(bench.memory.image(), expected.image());
}

#[test]
fn lint_word_count_matches_stored_words() {
    let text = ":0300000011223397\r\n:080010000000000100000002E5\r\n:00000001FF\r\n";

    let report = hexboot::lint::check(text).unwrap();
    let (bench, _) = load(text.as_bytes());

    assert_eq!(report.words, 3);
    assert_eq!(report.words, bench.memory.writes().len());
}
