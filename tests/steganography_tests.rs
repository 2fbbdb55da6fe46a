use lsb_stream::{
    error::StegoError,
    pixel_buffer::PixelBuffer,
    steganography::{Capacity, capacity, decode, encode},
};
use rand::{Rng, RngCore};
use std::cell::Cell;

/// 一个辅助函数，用于创建一个填充随机字节的缓冲区
fn random_buffer(height: usize, row_bytes: usize) -> PixelBuffer {
    let mut data = vec![0u8; height * row_bytes];
    rand::rng().fill_bytes(&mut data);
    PixelBuffer::from_raw(height, row_bytes, data).expect("buffer dimensions match")
}

/// 生成不含 0 字节的随机负载
fn random_payload(len: usize) -> Vec<u8> {
    let mut rng = rand::rng();
    (0..len).map(|_| rng.random_range(1..=u8::MAX)).collect()
}

#[test]
fn test_capacity_is_floor_of_total_bits() {
    assert_eq!(capacity(10, 8), 10);
    assert_eq!(capacity(3, 5), 1);
    assert_eq!(capacity(1, 7), 0);
    assert_eq!(capacity(0, 1024), 0);
    assert_eq!(capacity(100_000, 400_000), 5_000_000_000);
    // 乘积超出 u64 时不会溢出
    assert_eq!(capacity(u64::MAX, 8), u64::MAX);
}

#[test]
fn test_capacity_reports_spare_bits_and_usable_bytes() {
    let small = Capacity::of(3, 5);
    assert_eq!(small.total_bits, 15);
    assert_eq!(small.bytes, 1);
    assert_eq!(small.spare_bits, 7);
    assert_eq!(small.usable(), 0, "the only byte is taken by the terminator");

    let square = Capacity::of(10, 8);
    assert_eq!(square.spare_bits, 0);
    assert_eq!(square.usable(), 9);

    assert_eq!(Capacity::of(0, 0).usable(), 0);
    assert_eq!(Capacity::of_buffer(&PixelBuffer::new(8, 8).expect("dimensions fit")).bytes, 8);
}

/// 验证不同长度的负载都能完整恢复
#[test]
fn test_round_trip_random_payloads() {
    let template = random_buffer(37, 23);
    let usable = Capacity::of_buffer(&template).usable() as usize;

    for len in [0, 1, 2, 50, usable] {
        let mut buffer = template.clone();
        let payload = random_payload(len);

        let written = encode(&mut buffer, payload.iter().copied()).expect("payload fits");
        assert_eq!(written, len);

        let recovered: Vec<u8> = decode(&buffer).collect();
        assert_eq!(recovered, payload, "round trip failed for {len} bytes");
    }
}

/// 验证每个被修改的像素字节变化不超过 1
#[test]
fn test_encode_changes_each_cell_by_at_most_one() {
    let original = random_buffer(64, 48);
    let mut buffer = original.clone();
    let payload = random_payload(Capacity::of_buffer(&original).usable() as usize);

    encode(&mut buffer, payload).expect("payload fits");

    for (before, after) in original.as_bytes().iter().zip(buffer.as_bytes()) {
        assert!(before.abs_diff(*after) <= 1, "{before} became {after}");
    }
}

#[test]
fn test_encode_never_leaves_byte_range_at_extremes() {
    // 0 需要奇数时加 1
    let mut zeros = PixelBuffer::new(2, 8).expect("dimensions fit");
    encode(&mut zeros, [0xFF]).expect("one byte fits");
    assert_eq!(zeros.row(0), Some(&[1u8; 8][..]));
    assert_eq!(zeros.row(1), Some(&[0u8; 8][..]));

    // 255 需要偶数时减 1
    let mut full = PixelBuffer::from_raw(2, 8, vec![u8::MAX; 16]).expect("dimensions match");
    encode(&mut full, [0x01]).expect("one byte fits");
    assert_eq!(full.row(0), Some(&[254, 254, 254, 254, 254, 254, 254, 255][..]));
    assert_eq!(full.row(1), Some(&[254u8; 8][..]));
}

#[test]
fn test_perturbation_direction_depends_on_current_value() {
    let first_row: [u8; 8] = [127, 128, 126, 129, 0, 255, 10, 200];
    let mut buffer =
        PixelBuffer::from_rows(&[first_row, [0; 8]]).expect("rows have equal length");

    encode(&mut buffer, [0b1010_1010]).expect("one byte fits");

    assert_eq!(
        buffer.row(0),
        Some(&[127, 128, 127, 128, 1, 254, 11, 200][..])
    );
    assert_eq!(buffer.row(1), Some(&[0u8; 8][..]));
}

#[test]
fn test_bits_are_written_msb_first_then_by_column_then_by_row() {
    let mut buffer = PixelBuffer::new(6, 3).expect("dimensions fit");
    encode(&mut buffer, [0b1100_1010]).expect("one byte fits");

    let rows: Vec<&[u8]> = buffer.rows().collect();
    assert_eq!(
        rows,
        vec![
            &[1, 1, 0][..],
            &[0, 1, 0][..],
            &[1, 0, 0][..],
            &[0, 0, 0][..],
            &[0, 0, 0][..],
            &[0, 0, 0][..],
        ]
    );
}

/// 空负载只写入结束标记
#[test]
fn test_empty_payload_writes_only_the_terminator() {
    let original = random_buffer(4, 4);
    let mut buffer = original.clone();

    let written = encode(&mut buffer, std::iter::empty()).expect("terminator fits");
    assert_eq!(written, 0);
    assert_eq!(decode(&buffer).count(), 0);

    assert!(buffer.as_bytes()[..8].iter().all(|cell| cell % 2 == 0));
    assert_eq!(buffer.as_bytes()[8..], original.as_bytes()[8..]);
}

#[test]
fn test_out_of_space_boundary() {
    let template = random_buffer(8, 8);
    let cap = Capacity::of_buffer(&template).bytes as usize;

    let mut buffer = template.clone();
    let result = encode(&mut buffer, random_payload(cap));
    assert_eq!(
        result,
        Err(StegoError::OutOfSpace {
            written: cap,
            capacity: cap as u64,
        })
    );

    let mut buffer = template.clone();
    let payload = random_payload(cap - 1);
    assert_eq!(encode(&mut buffer, payload.iter().copied()), Ok(cap - 1));
    assert_eq!(decode(&buffer).collect::<Vec<u8>>(), payload);
}

#[test]
fn test_out_of_space_when_terminator_spills_into_spare_bits() {
    // 15 bits：1 个完整字节，剩余 7 位不足以写入结束标记
    let mut buffer = PixelBuffer::new(3, 5).expect("dimensions fit");
    assert!(encode(&mut buffer, std::iter::empty()).is_ok());

    let mut buffer = PixelBuffer::new(3, 5).expect("dimensions fit");
    assert!(matches!(
        encode(&mut buffer, *b"a"),
        Err(StegoError::OutOfSpace { written: 1, .. })
    ));
}

#[test]
fn test_empty_buffer_has_no_space_and_decodes_nothing() {
    let mut buffer = PixelBuffer::new(0, 0).expect("dimensions fit");
    assert_eq!(
        encode(&mut buffer, std::iter::empty()),
        Err(StegoError::OutOfSpace {
            written: 0,
            capacity: 0,
        })
    );
    assert_eq!(decode(&buffer).next(), None);

    let mut zero_width = PixelBuffer::new(5, 0).expect("dimensions fit");
    assert!(encode(&mut zero_width, std::iter::empty()).is_err());
    assert_eq!(decode(&zero_width).count(), 0);
}

/// 没有结束标记时返回所有完整的字节
#[test]
fn test_decode_without_terminator_returns_every_whole_byte() {
    let buffer = PixelBuffer::from_raw(5, 7, vec![1; 35]).expect("dimensions match");

    let decoder = decode(&buffer);
    assert_eq!(decoder.size_hint(), (0, Some(4)));

    let recovered: Vec<u8> = decoder.collect();
    assert_eq!(recovered, vec![0xFF; 4]);
}

#[test]
fn test_decode_is_lazy_and_fused() {
    let mut buffer = random_buffer(16, 16);
    encode(&mut buffer, *b"lazy").expect("payload fits");

    let mut decoder = decode(&buffer);
    assert_eq!(decoder.by_ref().take(2).collect::<Vec<u8>>(), b"la");
    assert_eq!(decoder.next(), Some(b'z'));
    assert_eq!(decoder.next(), Some(b'y'));
    assert_eq!(decoder.next(), None);
    assert_eq!(decoder.next(), None);

    // 每次调用 decode 都从头开始
    assert_eq!(decode(&buffer).collect::<Vec<u8>>(), b"lazy");
}

/// 负载中的 0 字节被当作结束标记，之后的数据不会被读取
#[test]
fn test_zero_byte_in_source_ends_the_payload() {
    let mut buffer = random_buffer(16, 16);
    let pulled = Cell::new(0);
    let source = b"ab\0cd".iter().copied().inspect(|_| pulled.set(pulled.get() + 1));

    assert_eq!(encode(&mut buffer, source), Ok(2));
    assert_eq!(pulled.get(), 3);
    assert_eq!(decode(&buffer).collect::<Vec<u8>>(), b"ab");
}

#[test]
fn test_open_ended_source_ends_at_exhaustion() {
    let mut buffer = random_buffer(16, 16);
    assert_eq!(encode(&mut buffer, std::iter::repeat_n(b'x', 5)), Ok(5));
    assert_eq!(decode(&buffer).collect::<Vec<u8>>(), b"xxxxx");
}

/// 连续两次编码互不影响
#[test]
fn test_consecutive_encodes_are_independent() {
    let mut first = random_buffer(12, 12);
    let mut second = random_buffer(12, 12);

    encode(&mut first, *b"first").expect("payload fits");
    encode(&mut second, *b"second").expect("payload fits");

    assert_eq!(decode(&first).collect::<Vec<u8>>(), b"first");
    assert_eq!(decode(&second).collect::<Vec<u8>>(), b"second");

    // 在同一缓冲区中写入更短的负载会覆盖之前的内容
    encode(&mut second, *b"2nd").expect("payload fits");
    assert_eq!(decode(&second).collect::<Vec<u8>>(), b"2nd");
}

/// 8x8 缓冲区中隐藏 "Hi" 只修改前 24 个像素字节
#[test]
fn test_hi_in_eight_by_eight_touches_three_rows() {
    let original = random_buffer(8, 8);
    let mut buffer = original.clone();
    assert_eq!(Capacity::of_buffer(&buffer).bytes, 8);

    encode(&mut buffer, *b"Hi").expect("payload fits");

    assert_eq!(buffer.as_bytes()[24..], original.as_bytes()[24..]);
    let lsbs: Vec<u8> = buffer.as_bytes()[..24].iter().map(|cell| cell & 1).collect();
    assert_eq!(
        lsbs,
        [
            0, 1, 0, 0, 1, 0, 0, 0, // 'H'
            0, 1, 1, 0, 1, 0, 0, 1, // 'i'
            0, 0, 0, 0, 0, 0, 0, 0, // terminator
        ]
    );
    assert_eq!(decode(&buffer).collect::<Vec<u8>>(), b"Hi");
}
