use std::path::Path;

fn main() {
    let proto_dir = Path::new("src/protocol/protos");
    println!("cargo:rerun-if-changed={}", proto_dir.display());

    protobuf_codegen::Codegen::new()
        .protoc()
        .protoc_path(&protoc_bin_vendored::protoc_bin_path().expect("could not find protoc binary"))
        .cargo_out_dir("protos")
        .include(proto_dir)
        .input(proto_dir.join("spirc.proto"))
        .run_from_script();
}
