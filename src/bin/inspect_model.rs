use std::env;
use std::fs::File;
use std::io::{BufReader, Read};

use bzip2::read::BzDecoder;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <model.svm[.bz2]>", args[0]);
        std::process::exit(1);
    }

    let path = &args[1];
    println!("Loading model: {}", path);

    let data = match read_all(path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path, e);
            std::process::exit(1);
        }
    };
    println!("{} bytes of model data", data.len());

    let header = &data[..data.len().min(256)];
    println!("\nFirst {} bytes:", header.len());
    for (i, chunk) in header.chunks(16).enumerate() {
        print!("{:04x}: ", i * 16);
        for b in chunk {
            print!("{:02x} ", b);
        }
        // Each 4-byte group as a little-endian integer
        print!(" ");
        for word in chunk.chunks_exact(4) {
            let value = i32::from_le_bytes([word[0], word[1], word[2], word[3]]);
            print!("{:>11} ", value);
        }
        println!();
    }

    println!("\nTrying skin_face::decode...");
    match skin_face::decode(&data) {
        Ok(model) => {
            println!("SUCCESS! Model loaded:");
            println!("  inputs: {}", model.number_of_inputs());
            println!("  support_vectors: {}", model.support_vectors().len());
            println!("  threshold: {:.9}", model.threshold());
            let largest = model
                .weights()
                .iter()
                .map(|w| w.abs())
                .fold(0.0, f64::max);
            println!("  largest |weight|: {:.9}", largest);
            match skin_face::FaceClassifier::new(model) {
                Ok(classifier) => {
                    let size = classifier.sample_size();
                    println!("  usable as {}x{} face classifier", size.width, size.height);
                }
                Err(e) => println!("  not usable as a face classifier: {}", e),
            }
        }
        Err(e) => {
            println!("FAILED: {}", e);
        }
    }
}

fn read_all(path: &str) -> std::io::Result<Vec<u8>> {
    let reader = BufReader::new(File::open(path)?);
    let mut data = Vec::new();
    if path.ends_with(".bz2") {
        BzDecoder::new(reader).read_to_end(&mut data)?;
    } else {
        let mut reader = reader;
        reader.read_to_end(&mut data)?;
    }
    Ok(data)
}
