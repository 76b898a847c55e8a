use serde::Serialize;

/// Letterhead printed on every invoice.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Company {
    pub name: &'static str,
    pub gstin: &'static str,
    pub address: [&'static str; 2],
    pub footer: [&'static str; 3],
}

pub const HIQODE: Company = Company {
    name: "HiQode Innovations",
    gstin: "29ABCDE1234F1Z5",
    address: [
        "#2317, Arka Building, 1st Main, 8th Cross,",
        "Vidhyanagara, Davanagere - 577005",
    ],
    footer: [
        "Terms: All fees include 18% GST. Payments are non-refundable once the course starts. For support, contact info@hiqode.in.",
        "Thank you for choosing HiQode Innovations. For support, please contact the HiQode team at https://www.hiqode.in",
        "This is a computer-generated invoice and does not require a physical signature.",
    ],
};
