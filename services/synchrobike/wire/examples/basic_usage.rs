//! Basic usage example for the synchrobike wire formats.

use synchro_wire::{
    decode_message, decode_packet, encode_gradient, GradientPalette, GradientStop, Message,
    WireError, WireFormat,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Synchrobike Wire Format Example ===\n");

    // 1. Define a gradient palette
    println!("1. Building a three-stop gradient...");
    let gradient = GradientPalette::new(&[
        GradientStop::new(0, 255, 0, 0),
        GradientStop::new(128, 0, 255, 0),
        GradientStop::new(255, 0, 0, 255),
    ])?;
    println!("   Stops: {}", gradient.len());

    // 2. Encode as an envelope packet
    println!("\n2. Encoding as envelope...");
    let envelope = encode_gradient(&gradient, WireFormat::Envelope);
    println!("   {} bytes: {:02X?}", envelope.len(), &envelope[..8]);

    let (packet_type, _) = decode_packet(&envelope)?;
    println!("   Decoded packet type: {:?}", packet_type);

    // 3. Encode as a flat palette
    println!("\n3. Encoding as flat palette...");
    let flat = encode_gradient(&gradient, WireFormat::Flat);
    println!("   {} bytes, tag {:?}", flat.len(), std::str::from_utf8(&flat[..7]));

    // 4. Dispatch both through the same decoder
    println!("\n4. Dispatching received buffers...");
    for buf in [&envelope[..], &flat[..]] {
        match decode_message(buf)? {
            Message::Gradient(g) => println!("   envelope with {} stops", g.len()),
            Message::Palette(p) => println!("   flat palette, first entry {:?}", p.entries()[0]),
        }
    }

    // 5. Rejections
    println!("\n5. Rejecting bad buffers...");
    let mut too_many = envelope.to_vec();
    too_many[5] = 8;
    let cases: [(&str, &[u8]); 3] = [
        ("foreign", b"hello mesh"),
        ("truncated", &envelope[..20]),
        ("too many colors", &too_many),
    ];
    for (name, buf) in cases {
        let err: WireError = decode_message(buf).unwrap_err();
        println!("   {}: {} (foreign: {})", name, err, err.is_foreign());
    }

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
