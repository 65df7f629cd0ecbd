use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use glyph_trace::decode::{
    DecodeError, REQUEST_IMAGE, decode_base64, gray_from_bytes, strip_data_url,
};
use glyph_trace::request::{PredictRequest, RequestError};
use glyph_trace_types::Shape;

fn png_bytes(width: u32, height: u32, ink: impl Fn(u32, u32) -> bool) -> Vec<u8> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("glyph.png");
    image::ImageBuffer::from_fn(width, height, |x, y| {
        image::Luma([if ink(x, y) { 0u8 } else { 255u8 }])
    })
    .save(&path)
    .unwrap();
    std::fs::read(&path).unwrap()
}

#[test]
fn data_url_prefix_is_stripped() {
    assert_eq!(strip_data_url("data:image/png;base64,QUJD"), "QUJD");
    assert_eq!(strip_data_url("  QUJD  "), "QUJD");
    assert_eq!(decode_base64("data:image/png;base64,QUJD", REQUEST_IMAGE).unwrap(), b"ABC");
}

#[test]
fn invalid_base64_is_a_decode_error() {
    match decode_base64("data:image/png;base64,@@not base64@@", REQUEST_IMAGE) {
        Err(DecodeError::Base64 { input, .. }) => assert_eq!(input, REQUEST_IMAGE),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn garbage_bytes_are_an_image_error() {
    let err = gray_from_bytes(b"definitely not a png", "upload").unwrap_err();
    assert!(matches!(err, DecodeError::Image { .. }));
    assert!(err.to_string().contains("upload"));
}

#[test]
fn base64_png_decodes_to_gray_grid() {
    let bytes = png_bytes(6, 4, |x, y| x == 2 && y == 1);
    let payload = format!("data:image/png;base64,{}", STANDARD.encode(&bytes));
    let decoded = decode_base64(&payload, REQUEST_IMAGE).unwrap();
    let gray = gray_from_bytes(&decoded, REQUEST_IMAGE).unwrap();
    assert_eq!(gray.shape(), Shape::new(4, 6));
    assert_eq!(gray.get(1, 2), Some(&0));
    assert_eq!(gray.get(0, 0), Some(&255));
}

#[test]
fn request_requires_an_image() {
    let request =
        PredictRequest::from_json(r#"{"image": "data:image/png;base64,QUJD", "expected": "ka"}"#)
            .unwrap();
    assert_eq!(request.expected.as_deref(), Some("ka"));

    for body in [r#"{"expected": "ka"}"#, r#"{"image": "  "}"#, "not json"] {
        assert!(
            matches!(
                PredictRequest::from_json(body),
                Err(RequestError::InvalidInput { .. })
            ),
            "{body}"
        );
    }
}
