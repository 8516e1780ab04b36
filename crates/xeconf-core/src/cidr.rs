// ── CIDR / netmask conversion ──
//
// IOS-XE models interface addresses as an (address, dotted-decimal mask)
// pair, while the declared form is a single `A.B.C.D/N` string. IPv4 only:
// dotted-decimal masks have no IPv6 meaning.

use std::net::Ipv4Addr;

use crate::projection::ProjectionError;

/// Split `A.B.C.D/N` into an address and a dotted-decimal netmask.
pub fn split_cidr(cidr: &str) -> Result<(String, String), ProjectionError> {
    let invalid = || ProjectionError::InvalidCidr {
        value: cidr.to_owned(),
    };

    let (addr_part, prefix_part) = cidr.split_once('/').ok_or_else(invalid)?;
    let addr: Ipv4Addr = addr_part.parse().map_err(|_| invalid())?;
    let prefix: u8 = prefix_part.parse().map_err(|_| invalid())?;
    if prefix > 32 {
        return Err(invalid());
    }

    Ok((addr.to_string(), mask_from_prefix(prefix).to_string()))
}

/// Combine an address and a dotted-decimal netmask back into `A.B.C.D/N`.
pub fn join_cidr(address: &str, mask: &str) -> Result<String, ProjectionError> {
    let addr: Ipv4Addr = address
        .parse()
        .map_err(|_| ProjectionError::InvalidCidr {
            value: address.to_owned(),
        })?;
    let prefix = prefix_from_mask(mask)?;
    Ok(format!("{addr}/{prefix}"))
}

fn mask_from_prefix(prefix: u8) -> Ipv4Addr {
    let bits = if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    };
    Ipv4Addr::from(bits)
}

/// Prefix length of a netmask; fails unless the mask is a contiguous run
/// of ones followed by zeros.
fn prefix_from_mask(mask: &str) -> Result<u8, ProjectionError> {
    let invalid = || ProjectionError::InvalidNetmask {
        value: mask.to_owned(),
    };

    let parsed: Ipv4Addr = mask.parse().map_err(|_| invalid())?;
    let bits = u32::from(parsed);
    let ones = bits.leading_ones();
    // A contiguous mask has nothing set after the leading run.
    if bits.checked_shl(ones).unwrap_or(0) != 0 {
        return Err(invalid());
    }
    u8::try_from(ones).map_err(|_| invalid())
}
