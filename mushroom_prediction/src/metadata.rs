use serde::Serialize;

/// Descriptive fields shown next to a predicted species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpeciesInfo {
    pub desc: &'static str,
    pub region: &'static str,
    pub edibility: &'static str,
}

pub const DEFAULT_INFO: SpeciesInfo = SpeciesInfo {
    desc: "Informasi tidak tersedia.",
    region: "Unknown",
    edibility: "Unknown",
};

/// The label set the classifier was trained on, in encoder order.
pub const SPECIES: [&str; 24] = [
    "Abrupta",
    "Agaricus",
    "Alloclavaria",
    "Amanita",
    "Bisporella",
    "Boletus",
    "Chanterelle",
    "Chlorociboria",
    "Clathrus",
    "Cordyceps",
    "Cortinarius",
    "Cytidia",
    "Geastrum",
    "Gliophorus",
    "Gyromitra",
    "Helvella",
    "Hydnellum",
    "Lactarius",
    "Morchella",
    "Mycena",
    "Pleurotus",
    "Russula",
    "Tremella",
    "Tuber",
];

const fn info(desc: &'static str, region: &'static str, edibility: &'static str) -> SpeciesInfo {
    SpeciesInfo {
        desc,
        region,
        edibility,
    }
}

/// Metadata for a species label, [`DEFAULT_INFO`] when the label is unknown.
pub fn lookup(label: &str) -> SpeciesInfo {
    match label {
        "Abrupta" => info(
            "Jamur dengan bentuk unik yang tidak beraturan.",
            "Amerika Utara",
            "Tidak Diketahui",
        ),
        "Agaricus" => info(
            "Genus jamur yang mencakup jamur kancing umum.",
            "Seluruh Dunia",
            "Dapat Dimakan (Sebagian)",
        ),
        "Alloclavaria" => info(
            "Jamur berbentuk koral berwarna ungu.",
            "Amerika Utara",
            "Tidak Diketahui",
        ),
        "Amanita" => info(
            "Genus yang mencakup beberapa jamur paling beracun.",
            "Seluruh Dunia",
            "Beracun / Mematikan",
        ),
        "Bisporella" => info(
            "Jamur cangkir kuning kecil yang tumbuh di kayu.",
            "Eropa & Amerika",
            "Tidak Dimakan",
        ),
        "Boletus" => info(
            "Jamur berpori, banyak yang lezat seperti Porcini.",
            "Hemisfer Utara",
            "Dapat Dimakan (Populer)",
        ),
        "Chanterelle" => info(
            "Jamur corong berwarna oranye/kuning, sangat lezat.",
            "Hutan sejuk",
            "Dapat Dimakan (Pilihan)",
        ),
        "Chlorociboria" => info(
            "Jamur cangkir hijau teal, menodai kayu.",
            "Seluruh Dunia",
            "Tidak Dimakan",
        ),
        "Clathrus" => info(
            "Jamur keranjang merah, bau busuk.",
            "Tropis & Subtropis",
            "Tidak Dimakan",
        ),
        "Cordyceps" => info(
            "Jamur parasit yang tumbuh pada serangga.",
            "Asia & Tropis",
            "Obat Tradisional",
        ),
        "Cortinarius" => info(
            "Genus besar, banyak yang beracun mematikan.",
            "Seluruh Dunia",
            "Beracun",
        ),
        "Cytidia" => info(
            "Jamur kerak yang tumbuh di kayu.",
            "Afrika & Asia",
            "Tidak Dimakan",
        ),
        "Geastrum" => info(
            "Jamur bintang bumi, bentuknya seperti bintang.",
            "Seluruh Dunia",
            "Tidak Dimakan",
        ),
        "Gliophorus" => info(
            "Jamur kecil, berlendir, dan berwarna cerah.",
            "Eropa & Australia",
            "Tidak Dimakan",
        ),
        "Gyromitra" => info(
            "Morel palsu, mengandung racun mematikan jika mentah.",
            "Eropa & Amerika",
            "Beracun",
        ),
        "Helvella" => info(
            "Jamur pelana, bentuk topi aneh.",
            "Hemisfer Utara",
            "Beracun (jika mentah)",
        ),
        "Hydnellum" => info(
            "Jamur gigi, sering mengeluarkan cairan merah.",
            "Amerika Utara",
            "Tidak Dimakan (Keras)",
        ),
        "Lactarius" => info(
            "Jamur susu, mengeluarkan getah saat dipotong.",
            "Seluruh Dunia",
            "Dapat Dimakan (Sebagian)",
        ),
        "Morchella" => info(
            "Morel sejati, berbentuk sarang lebah, sangat dicari.",
            "Hemisfer Utara",
            "Dapat Dimakan (Istimewa)",
        ),
        "Mycena" => info(
            "Jamur bonnet kecil, rapuh.",
            "Seluruh Dunia",
            "Tidak Dimakan",
        ),
        "Pleurotus" => info(
            "Jamur tiram, tumbuh di kayu, populer dimasak.",
            "Seluruh Dunia",
            "Dapat Dimakan",
        ),
        "Russula" => info(
            "Jamur rapuh dengan warna topi cerah.",
            "Seluruh Dunia",
            "Bervariasi (Hati-hati)",
        ),
        "Tremella" => info(
            "Jamur kuping jeli, tekstur kenyal.",
            "Tropis & Subtropis",
            "Dapat Dimakan (Obat/Sup)",
        ),
        "Tuber" => info(
            "Truffle, jamur bawah tanah yang sangat mahal.",
            "Eropa",
            "Dapat Dimakan (Mewah)",
        ),
        _ => DEFAULT_INFO,
    }
}
