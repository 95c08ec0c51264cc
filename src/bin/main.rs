//! VRAW Export CLI
//!
//! Export meshes and skeletal rigs described in JSON to VRAW/ANIM files.

use clap::{Parser, Subcommand};
use vraw_export::{
    export_mesh, export_skeleton, read_vraw, ExportConfig, MeshData, MeshSource, RigData,
    RigSource,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vraw-export")]
#[command(author, version, about = "Export meshes and skeletons to VRAW/ANIM files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a mesh from a JSON input file
    Mesh {
        /// Input JSON file containing mesh data
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (text output appends .yml)
        #[arg(short, long)]
        output: PathBuf,

        /// Export vertex normals
        #[arg(long)]
        normals: bool,

        /// Export one texture coordinate channel per UV layer
        #[arg(long)]
        textures: bool,

        /// Export tangents and binormals (requires --textures)
        #[arg(long)]
        tangents: bool,

        /// Flip the V texture coordinate
        #[arg(long)]
        flip_v: bool,

        /// Export bone weights and bone indices
        #[arg(long)]
        bone_weights: bool,

        /// Write the YAML-like text form instead of binary
        #[arg(long)]
        text: bool,
    },

    /// Export a skeleton from a JSON rig file
    Skeleton {
        /// Input JSON file containing rig data
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (text output appends .yml)
        #[arg(short, long)]
        output: PathBuf,

        /// Write the YAML-like text form instead of binary
        #[arg(long)]
        text: bool,
    },

    /// Show the element table and counts of a VRAW file
    Inspect {
        /// VRAW file to read
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mesh {
            input,
            output,
            normals,
            textures,
            tangents,
            flip_v,
            bone_weights,
            text,
        } => {
            let config = ExportConfig::new()
                .with_normals(normals)
                .with_textures(textures)
                .with_tangent_space(tangents)
                .with_v_flipped(flip_v)
                .with_bone_weights(bone_weights)
                .with_binary(!text);
            mesh_from_json(&input, &output, &config)?;
        }
        Commands::Skeleton {
            input,
            output,
            text,
        } => {
            skeleton_from_json(&input, &output, !text)?;
        }
        Commands::Inspect { input } => {
            show_vraw_info(&input)?;
        }
    }

    Ok(())
}

fn mesh_from_json(
    input_path: &PathBuf,
    output_path: &PathBuf,
    config: &ExportConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading mesh data from {:?}...", input_path);
    let mesh = MeshData::load(input_path)?;
    println!(
        "  Loaded {} vertices, {} polygons, {} UV layers",
        mesh.vertex_count(),
        mesh.polygon_count(),
        mesh.uv_layers().len()
    );

    println!("Exporting with config:");
    println!("  - Normals: {}", config.export_normals);
    println!("  - Textures: {}", config.export_textures);
    println!("  - Tangent space: {}", config.export_tangent_space);
    println!("  - V flipped: {}", config.export_v_flipped);
    println!("  - Bone weights: {}", config.export_bone_weights);
    println!("  - Binary: {}", config.export_binary);

    let written = export_mesh(&mesh, output_path, config)?;
    println!("Exported mesh to {:?}", written);

    Ok(())
}

fn skeleton_from_json(
    input_path: &PathBuf,
    output_path: &PathBuf,
    binary: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading rig data from {:?}...", input_path);
    let mut rig = RigData::load(input_path)?;
    println!("  Loaded {} bones", rig.bone_count());

    let written = export_skeleton(&mut rig, output_path, binary)?;
    println!("Exported skeleton to {:?}", written);

    Ok(())
}

fn show_vraw_info(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    println!("Reading VRAW file {:?}...", path);
    let export = read_vraw(path)?;

    println!("\nVertex Elements:");
    for element in export.layout.elements() {
        println!(
            "  {:>3}  {}{}  {} x {} bytes, flags {:?}",
            element.offset,
            element.usage.name(),
            element.usage_index,
            element.component_count,
            element.component_size,
            element.flags
        );
    }
    println!("  Stride: {} bytes", export.layout.stride());
    println!("\nVertices: {}", export.vertex_count());
    println!("Triangles: {}", export.triangle_count());

    Ok(())
}
