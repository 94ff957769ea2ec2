//! ERC20 read-only ABI: `balanceOf(address)` and `decimals()`.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

sol! {
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256 balance);
        function decimals() external view returns (uint8);
    }
}

/// Calldata for `balanceOf(owner)`.
pub fn balance_of_calldata(owner: Address) -> Bytes {
    IERC20::balanceOfCall { owner }.abi_encode().into()
}

/// Calldata for `decimals()`.
pub fn decimals_calldata() -> Bytes {
    IERC20::decimalsCall {}.abi_encode().into()
}

/// Decode the return data of `balanceOf`.
pub fn decode_balance(data: &[u8]) -> Result<U256, alloy::sol_types::Error> {
    IERC20::balanceOfCall::abi_decode_returns(data)
}

/// Decode the return data of `decimals`.
pub fn decode_decimals(data: &[u8]) -> Result<u8, alloy::sol_types::Error> {
    IERC20::decimalsCall::abi_decode_returns(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn word(value: u64) -> Vec<u8> {
        U256::from(value).to_be_bytes::<32>().to_vec()
    }

    #[test]
    fn test_balance_of_selector_and_argument() {
        let owner = address!("f7b10d603907658f690da534e9b7dbc4dab3e2d6");
        let data = balance_of_calldata(owner);
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(&data[16..], owner.as_slice());
    }

    #[test]
    fn test_decimals_selector() {
        assert_eq!(&decimals_calldata()[..], &[0x31, 0x3c, 0xe5, 0x67]);
    }

    #[test]
    fn test_decode_balance_word() {
        let balance = decode_balance(&word(2_500_000)).unwrap();
        assert_eq!(balance, U256::from(2_500_000u64));
    }

    #[test]
    fn test_decode_decimals_word() {
        assert_eq!(decode_decimals(&word(6)).unwrap(), 6);
    }

    #[test]
    fn test_decode_empty_return_fails() {
        // Calls to an address without code return `0x`.
        assert!(decode_balance(&[]).is_err());
        assert!(decode_decimals(&[]).is_err());
    }
}
