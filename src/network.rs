use core::fmt;
use core::net::Ipv4Addr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    EmptySubnetMask,
    NonContiguousSubnetMask,
    InvalidHostAddress,
    NetworkAddress,
    BroadcastAddress,
    GatewayOutsideSubnet,
    GatewayIsHost,
    GatewayNotHost,
    UnspecifiedDns,
    ZeroMacAddress,
    MulticastMacAddress,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::EmptySubnetMask => "subnet mask is 0.0.0.0",
            Error::NonContiguousSubnetMask => "subnet mask is not contiguous",
            Error::InvalidHostAddress => "ip is not a unicast host address",
            Error::NetworkAddress => "ip is the network address of its subnet",
            Error::BroadcastAddress => "ip is the broadcast address of its subnet",
            Error::GatewayOutsideSubnet => "gateway is outside the subnet",
            Error::GatewayIsHost => "gateway equals the device ip",
            Error::GatewayNotHost => "gateway is the network or broadcast address of its subnet",
            Error::UnspecifiedDns => "dns server is 0.0.0.0",
            Error::ZeroMacAddress => "mac address is all zeros",
            Error::MulticastMacAddress => "mac address has the multicast bit set",
        };
        f.write_str(msg)
    }
}

/// Ethernet hardware address of a wired board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.0 == [0; 6] {
            return Err(Error::ZeroMacAddress);
        }
        if self.is_multicast() {
            return Err(Error::MulticastMacAddress);
        }
        Ok(())
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// Fixed IPv4 addressing used instead of DHCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticAddressing {
    pub ip: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub dns: Ipv4Addr,
    pub subnet: Ipv4Addr,
}

/// CIDR prefix length of a contiguous subnet mask (`255.255.255.0` is 24).
pub fn prefix_len(subnet: Ipv4Addr) -> Result<u8, Error> {
    let mask = u32::from(subnet);
    if mask == 0 {
        return Err(Error::EmptySubnetMask);
    }

    let ones = mask.leading_ones();
    if mask.checked_shl(ones).unwrap_or(0) != 0 {
        return Err(Error::NonContiguousSubnetMask);
    }

    Ok(ones as u8)
}

impl StaticAddressing {
    pub fn prefix_len(&self) -> Result<u8, Error> {
        prefix_len(self.subnet)
    }

    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.ip) & u32::from(self.subnet))
    }

    pub fn broadcast(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.ip) | !u32::from(self.subnet))
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & u32::from(self.subnet) == u32::from(self.network())
    }

    pub fn validate(&self) -> Result<(), Error> {
        let prefix = self.prefix_len()?;

        if self.ip.is_unspecified() || self.ip.is_broadcast() || self.ip.is_multicast() {
            return Err(Error::InvalidHostAddress);
        }

        // /31 and /32 have no network or broadcast address
        let bounds = [self.network(), self.broadcast()];
        if prefix <= 30 {
            if self.ip == bounds[0] {
                return Err(Error::NetworkAddress);
            }
            if self.ip == bounds[1] {
                return Err(Error::BroadcastAddress);
            }
        }

        if !self.contains(self.gateway) {
            return Err(Error::GatewayOutsideSubnet);
        }
        if self.gateway == self.ip {
            return Err(Error::GatewayIsHost);
        }
        if prefix <= 30 && bounds.contains(&self.gateway) {
            return Err(Error::GatewayNotHost);
        }
        if self.dns.is_unspecified() {
            return Err(Error::UnspecifiedDns);
        }

        Ok(())
    }
}
